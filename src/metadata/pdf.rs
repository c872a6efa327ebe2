//! PDF metadata from the document Info dictionary, with the catalog's XMP
//! packet filling in whatever the Info dictionary lacks.

use lopdf::{Dictionary, Document};
use tracing::debug;

use super::{Metadata, xml};

pub fn parse(bytes: &[u8]) -> Option<Metadata> {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "unreadable PDF");
            return None;
        }
    };
    if doc.is_encrypted() && doc.encryption_state.is_none() {
        debug!("PDF needs a password");
        return None;
    }

    let from_info = info_dictionary(&doc).map(|info| Metadata {
        author: text_entry(&doc, info, b"Author"),
        title: text_entry(&doc, info, b"Title"),
    });

    let merged = match from_info {
        Some(meta) if meta.author.is_some() && meta.title.is_some() => meta,
        partial => match (partial, xmp_metadata(&doc)) {
            (Some(info), Some(xmp)) => Metadata {
                author: info.author.or(xmp.author),
                title: info.title.or(xmp.title),
            },
            (Some(one), None) | (None, Some(one)) => one,
            (None, None) => return None,
        },
    };
    (!merged.is_empty()).then_some(merged)
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    let (_, info) = doc.dereference(info).ok()?;
    info.as_dict().ok()
}

/// A text string entry, following an indirect reference if there is one.
/// Blank values count as missing.
fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = dict.get_deref(key, doc).ok()?;
    let text = lopdf::decode_text_string(value).ok()?;
    let text = text.trim_matches(char::from(0)).trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn xmp_metadata(doc: &Document) -> Option<Metadata> {
    let stream = doc.catalog().ok()?.get_deref(b"Metadata", doc).ok()?.as_stream().ok()?;
    let content = stream.get_plain_content().ok()?;
    let packet = xml::decode_bytes(&content);
    let packet = xml::parse(&packet)?;

    let title = xmp_list(&packet, "title").into_iter().next();
    let creators = xmp_list(&packet, "creator");
    let author = (!creators.is_empty()).then(|| creators.join(", "));
    let meta = Metadata { author, title };
    (!meta.is_empty()).then_some(meta)
}

// dc:title and dc:creator wrap their values in rdf:Alt / rdf:Seq lists.
fn xmp_list(packet: &roxmltree::Document<'_>, element: &str) -> Vec<String> {
    let Some(node) = xml::elements(packet, element).next() else {
        return Vec::new();
    };
    let items: Vec<String> = node
        .descendants()
        .filter(|child| child.is_element() && child.tag_name().name() == "li")
        .map(xml::text_content)
        .filter(|text| !text.is_empty())
        .collect();
    if items.is_empty() {
        let text = xml::text_content(node);
        if text.is_empty() { Vec::new() } else { vec![text] }
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, Stream, StringFormat, dictionary};

    /// A saved PDF whose trailer points at `info`, built by `fill`.
    fn pdf_with(fill: impl FnOnce(&mut Document) -> Option<Object>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let outline = doc.add_object(dictionary! { "Title" => Object::string_literal("Chapter One") });
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Outlines" => outline });
        doc.trailer.set("Root", catalog);
        if let Some(info) = fill(&mut doc) {
            doc.trailer.set("Info", info);
        }
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn direct_info(info: Dictionary) -> Vec<u8> {
        pdf_with(|doc| Some(Object::Reference(doc.add_object(info))))
    }

    #[test]
    fn test_reads_info_dictionary_not_outline() {
        let pdf = direct_info(dictionary! {
            "Title" => Object::string_literal("The Left Hand of Darkness"),
            "Author" => Object::string_literal("Le Guin, Ursula K."),
        });
        let meta = parse(&pdf).unwrap();
        assert_eq!(meta.title.as_deref(), Some("The Left Hand of Darkness"));
        assert_eq!(meta.author.as_deref(), Some("Le Guin, Ursula K."));
    }

    #[test]
    fn test_indirect_string_values() {
        let pdf = pdf_with(|doc| {
            let title = doc.add_object(Object::string_literal("Real Title"));
            let author = doc.add_object(Object::string_literal("Jane Roe"));
            let info = doc.add_object(dictionary! { "Title" => title, "Author" => author });
            Some(Object::Reference(info))
        });
        let meta = parse(&pdf).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Real Title"));
        assert_eq!(meta.author.as_deref(), Some("Jane Roe"));
    }

    #[test]
    fn test_info_inside_object_stream() {
        let mut doc = Document::with_version("1.5");
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog" });
        let info = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Packed Away"),
            "Author" => Object::string_literal("Ann Author"),
        });
        doc.trailer.set("Root", catalog);
        doc.trailer.set("Info", info);
        let mut bytes = Vec::new();
        doc.save_modern(&mut bytes).unwrap();

        let meta = parse(&bytes).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Packed Away"));
        assert_eq!(meta.author.as_deref(), Some("Ann Author"));
    }

    #[test]
    fn test_utf16_and_pdfdoc_strings() {
        let pdf = direct_info(dictionary! {
            "Title" => Object::String(b"\xFE\xFF\x00D\x00u\x00n\x00e".to_vec(), StringFormat::Hexadecimal),
            "AuthorSort" => Object::string_literal("x"),
            "Author" => Object::string_literal(b"Caf\xE9".to_vec()),
        });
        let meta = parse(&pdf).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Dune"));
        assert_eq!(meta.author.as_deref(), Some("Café"));
    }

    #[test]
    fn test_xmp_fills_missing_fields() {
        let packet = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<rdf:Description xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:title><rdf:Alt><rdf:li xml:lang="x-default">Neuromancer</rdf:li></rdf:Alt></dc:title>
<dc:creator><rdf:Seq><rdf:li>William Gibson</rdf:li><rdf:li>Second Hand</rdf:li></rdf:Seq></dc:creator>
</rdf:Description></rdf:RDF></x:xmpmeta>"#;

        let mut doc = Document::with_version("1.5");
        let metadata = doc.add_object(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            packet.as_bytes().to_vec(),
        ));
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Metadata" => metadata });
        let info = doc.add_object(dictionary! { "Title" => Object::string_literal("From Info") });
        doc.trailer.set("Root", catalog);
        doc.trailer.set("Info", info);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let meta = parse(&bytes).unwrap();
        assert_eq!(meta.title.as_deref(), Some("From Info"));
        assert_eq!(meta.author.as_deref(), Some("William Gibson, Second Hand"));
    }

    #[test]
    fn test_no_metadata() {
        assert!(parse(&pdf_with(|_| None)).is_none());
        assert!(parse(&direct_info(dictionary! {
            "Producer" => Object::string_literal("pdfTeX"),
            "Title" => Object::string_literal(""),
        }))
        .is_none());
        assert!(parse(b"not a pdf at all").is_none());
    }
}
