//! Reads the small XML documents that carry book metadata: OPF package
//! files, Office core properties and XMP packets. Elements are matched by
//! local name, so whatever prefix a producer picked for a namespace works.

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

/// Parses `xml`, returning `None` for malformed input.
///
/// DTDs are accepted because older OPF files declare one; entity expansion
/// limits stay in force.
pub fn parse(xml: &str) -> Option<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    match Document::parse_with_options(xml, options) {
        Ok(doc) => Some(doc),
        Err(e) => {
            debug!(error = %e, "unreadable XML");
            None
        }
    }
}

/// Every element named `local_name` in any namespace, in document order.
pub fn elements<'a, 'input>(
    doc: &'a Document<'input>,
    local_name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(move |node| node.is_element() && node.tag_name().name() == local_name)
}

/// Text content of every `local_name` element. Nested markup is flattened,
/// whitespace collapsed and empty elements skipped.
pub fn element_texts(doc: &Document<'_>, local_name: &str) -> Vec<String> {
    elements(doc, local_name)
        .map(text_content)
        .filter(|text| !text.is_empty())
        .collect()
}

pub fn first_element_text(doc: &Document<'_>, local_name: &str) -> Option<String> {
    element_texts(doc, local_name).into_iter().next()
}

/// Value of `attribute` on the first `local_name` element carrying it.
pub fn attribute(doc: &Document<'_>, local_name: &str, attribute: &str) -> Option<String> {
    elements(doc, local_name)
        .find_map(|node| node.attribute(attribute))
        .map(str::to_string)
}

pub fn text_content(node: Node<'_, '_>) -> String {
    let joined = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect::<Vec<_>>()
        .join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes bytes as UTF-8, falling back to Latin-1 for legacy documents.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title id="t1">Pride &amp; Prejudice</dc:title>
    <dc:creator opf:role="aut">Austen, Jane</dc:creator>
    <dc:creator/>
    <dc:creator>  Someone
      Else </dc:creator>
  </metadata>
</package>"#;

    #[test]
    fn test_element_texts_any_prefix() {
        let doc = parse(OPF).unwrap();
        assert_eq!(first_element_text(&doc, "title").as_deref(), Some("Pride & Prejudice"));
        assert_eq!(element_texts(&doc, "creator"), vec!["Austen, Jane", "Someone Else"]);
        assert_eq!(first_element_text(&doc, "subject"), None);
    }

    #[test]
    fn test_attribute() {
        let container = r#"<container><rootfiles><rootfile full-path='OEBPS/content.opf' media-type="application/oebps-package+xml"/></rootfiles></container>"#;
        let doc = parse(container).unwrap();
        assert_eq!(attribute(&doc, "rootfile", "full-path").as_deref(), Some("OEBPS/content.opf"));
        assert_eq!(attribute(&doc, "rootfile", "missing"), None);
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse("<t>caf&#233; &#x2014; &lt;b&gt; <![CDATA[raw & ready]]></t>").unwrap();
        assert_eq!(first_element_text(&doc, "t").as_deref(), Some("café — <b> raw & ready"));
    }

    #[test]
    fn test_doctype_is_accepted() {
        let xml = r#"<!DOCTYPE package [<!ENTITY house "Penguin">]>
<package><metadata><title>&house; Classics</title></metadata></package>"#;
        let doc = parse(xml).unwrap();
        assert_eq!(first_element_text(&doc, "title").as_deref(), Some("Penguin Classics"));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse("<package><title>unclosed</package>").is_none());
        assert!(parse("<dc:title>undeclared prefix</dc:title>").is_none());
    }

    #[test]
    fn test_decode_bytes_latin1_fallback() {
        assert_eq!(decode_bytes(b"caf\xe9"), "café");
        assert_eq!(decode_bytes("\u{feff}ok".as_bytes()), "ok");
    }
}
