use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on the base name in UTF-8 bytes. Leaves room for a ` (N)`
/// suffix and the extension under the usual 255-byte filename limit.
pub const MAX_BASE_NAME_BYTES: usize = 200;

/// Longest filename most filesystems accept, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Authors listed in a filename before the rest collapse into "et al.".
pub const DEFAULT_MAX_AUTHORS: usize = 3;

const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DEVICE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])$").expect("valid regex"));
static AUTHOR_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[;/\\|&]|\band\b|\by\b").expect("valid regex"));
static LAST_FIRST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^,]+),\s*(.+)$").expect("valid regex"));

/// Builds the base filename from an author/title pair.
///
/// Returns `None` when neither part survives cleaning, which callers treat
/// as "no metadata".
pub fn sanitize(author: Option<&str>, title: Option<&str>) -> Option<String> {
    let author = author.map(clean_component).filter(|s| !s.is_empty());
    let title = title.map(clean_component).filter(|s| !s.is_empty());

    let base = match (author, title) {
        (None, None) => return None,
        (Some(one), None) | (None, Some(one)) => one,
        (Some(author), Some(title)) => format!("{} - {}", author, title),
    };

    finish_base(&base)
}

/// Fits an already cleaned base name to the length limit and guards device
/// names. Returns `None` if nothing is left.
pub fn finish_base(base: &str) -> Option<String> {
    let base = truncate_at_boundary(base, MAX_BASE_NAME_BYTES);
    let base = if DEVICE_NAME.is_match(&base) { format!("_{}", base) } else { base };

    if base.is_empty() { None } else { Some(base) }
}

/// Strips characters a filesystem won't accept and tidies whitespace.
pub fn clean_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1f | 0x7f) || c.is_whitespace())
        .map(|c| if RESERVED_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    let collapsed = WHITESPACE.replace_all(&replaced, " ");
    trim_name(&collapsed).to_string()
}

fn trim_name(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

// Cuts to at most `max_bytes` on a char boundary. A cut inside a word backs
// up to the previous whitespace, unless that would drop more than half.
fn truncate_at_boundary(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut cut = max_bytes;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    let head = &s[..cut];
    let mid_word = !s[cut..].starts_with(char::is_whitespace);
    let head = match head.rfind(char::is_whitespace) {
        Some(space) if mid_word && space >= cut / 2 => &head[..space],
        _ => head,
    };
    trim_name(head).to_string()
}

/// Normalizes a free-form author field to `"First Last, First2 Last2"`.
///
/// Handles `;`, `/`, `&`, `and` separated lists and `"Last, First"` pairs.
/// Duplicates are dropped, first occurrence wins.
pub fn normalize_authors(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = AUTHOR_SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let items: Vec<String> = if parts.len() > 1 {
        parts.into_iter().map(str::to_string).collect()
    } else {
        split_comma_list(raw)
    };

    let mut seen = HashSet::new();
    let normalized: Vec<String> = items
        .iter()
        .map(|item| match LAST_FIRST.captures(item) {
            Some(caps) => format!("{} {}", caps[2].trim(), caps[1].trim()),
            None => item.clone(),
        })
        .map(|name| WHITESPACE.replace_all(&name, " ").trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect();

    if normalized.is_empty() { None } else { Some(normalized.join(", ")) }
}

// A lone "Last, First" stays one author. An odd number of commas >= 3 is a
// list of "Last, First" pairs; anything else is a plain comma list.
fn split_comma_list(raw: &str) -> Vec<String> {
    let commas = raw.matches(',').count();
    if commas <= 1 {
        return vec![raw.to_string()];
    }

    let tokens: Vec<&str> = raw.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    if commas % 2 == 1 {
        tokens
            .chunks(2)
            .map(|pair| pair.join(", "))
            .collect()
    } else {
        tokens.into_iter().map(str::to_string).collect()
    }
}

/// Renders a normalized author list for use in a filename.
pub fn format_authors(normalized: &str, max_authors: usize) -> String {
    let authors: Vec<String> = normalized
        .split(',')
        .map(clean_component)
        .filter(|a| !a.is_empty())
        .collect();

    let max_authors = max_authors.max(1);
    if authors.len() <= max_authors {
        authors.join(", ")
    } else {
        format!("{} et al.", authors[..max_authors].join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_composes_author_and_title() {
        assert_eq!(sanitize(Some("Ursula K. Le Guin"), Some("The Dispossessed")).as_deref(), Some("Ursula K. Le Guin - The Dispossessed"));
        assert_eq!(sanitize(None, Some("Dune")).as_deref(), Some("Dune"));
        assert_eq!(sanitize(Some("Frank Herbert"), Some("   ")).as_deref(), Some("Frank Herbert"));
        assert_eq!(sanitize(None, None), None);
        assert_eq!(sanitize(Some(""), Some("...")), None);
    }

    #[test]
    fn test_sanitize_removes_reserved_characters() {
        let name = sanitize(Some("A/B\\C"), Some(r#"What? <Why>: "Now" | *"#)).unwrap();
        assert!(!name.contains(RESERVED_CHARS));
        assert_eq!(name, "A B C - What Why Now");
    }

    #[test]
    fn test_sanitize_collapses_whitespace_and_control_chars() {
        assert_eq!(sanitize(Some("  Jane \t\n Doe "), Some("Tit\u{7}le.")).as_deref(), Some("Jane Doe - Title"));
    }

    #[test]
    fn test_sanitize_prefixes_device_names() {
        assert_eq!(sanitize(None, Some("con")).as_deref(), Some("_con"));
        assert_eq!(sanitize(None, Some("LPT1")).as_deref(), Some("_LPT1"));
        assert_eq!(sanitize(None, Some("Console")).as_deref(), Some("Console"));
    }

    #[test]
    fn test_sanitize_truncates_at_word_boundary() {
        let title = "word ".repeat(60);
        let name = sanitize(None, Some(&title)).unwrap();
        assert!(name.len() <= MAX_BASE_NAME_BYTES);
        assert!(name.ends_with("word"));

        let unbroken = "x".repeat(300);
        assert_eq!(sanitize(None, Some(&unbroken)).unwrap().len(), MAX_BASE_NAME_BYTES);
    }

    #[test]
    fn test_sanitize_keeps_word_ending_exactly_at_limit() {
        let head = format!("{} {}", "a".repeat(100), "b".repeat(99));
        let title = format!("{} cc", head);
        assert_eq!(sanitize(None, Some(&title)).as_deref(), Some(head.as_str()));
    }

    #[test]
    fn test_sanitize_limits_bytes_for_wide_characters() {
        let title = "書".repeat(150);
        let name = sanitize(Some("著者"), Some(&title)).unwrap();
        assert!(name.len() <= MAX_BASE_NAME_BYTES, "{} bytes", name.len());
        assert!(name.starts_with("著者 - 書書"));

        let mut taken = crate::collision::ReservationSet::new();
        crate::collision::resolve(&name, "epub", &mut taken);
        let second = crate::collision::resolve(&name, "epub", &mut taken);
        assert!(second.len() <= MAX_FILE_NAME_BYTES);

        let accented = sanitize(None, Some(&"é".repeat(150))).unwrap();
        assert_eq!(accented.len(), MAX_BASE_NAME_BYTES);
    }

    #[test]
    fn test_normalize_authors() {
        assert_eq!(normalize_authors("Herbert, Frank").as_deref(), Some("Frank Herbert"));
        assert_eq!(normalize_authors("Terry Pratchett & Neil Gaiman").as_deref(), Some("Terry Pratchett, Neil Gaiman"));
        assert_eq!(normalize_authors("Gaiman, Neil; Pratchett, Terry").as_deref(), Some("Neil Gaiman, Terry Pratchett"));
        assert_eq!(normalize_authors("Gaiman, Neil, Pratchett, Terry").as_deref(), Some("Neil Gaiman, Terry Pratchett"));
        assert_eq!(normalize_authors("Alpha, Beta, Gamma").as_deref(), Some("Alpha, Beta, Gamma"));
        assert_eq!(normalize_authors("Doe, Jane, Roe, Richard, Poe, Edgar").as_deref(), Some("Jane Doe, Richard Roe, Edgar Poe"));
        assert_eq!(normalize_authors("Anon and Anon").as_deref(), Some("Anon"));
        assert_eq!(normalize_authors("   "), None);
    }

    #[test]
    fn test_format_authors_limits_count() {
        assert_eq!(format_authors("A One, B Two", 3), "A One, B Two");
        assert_eq!(format_authors("A, B, C, D", 3), "A, B, C et al.");
        assert_eq!(format_authors("A: x, B", 3), "A x, B");
    }
}
