use std::sync::LazyLock;

use regex::Regex;

use super::Metadata;

/// Bytes of a text file inspected for header lines.
pub const HEADER_BYTES: usize = 4000;
const HEADER_LINES: usize = 10;

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^title\s*[:\-]\s*(.+)$").expect("valid regex"));
static AUTHOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^author\s*[:\-]\s*(.+)$").expect("valid regex"));
static BY_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^by\s+(.+)$").expect("valid regex"));

/// Reads `Title:` / `Author:` header lines, Project Gutenberg style.
///
/// A bare first line only counts as the title when a `by <name>` line
/// follows it; otherwise ordinary prose would be mistaken for a title.
pub fn parse(head: &str) -> Option<Metadata> {
    let lines: Vec<&str> = head
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(HEADER_LINES)
        .collect();

    let mut title = None;
    let mut author = None;
    for line in &lines {
        if title.is_none() {
            title = capture(&TITLE_LINE, line);
        }
        if author.is_none() {
            author = capture(&AUTHOR_LINE, line);
        }
    }

    if title.is_none() && author.is_none() {
        if let Some(by) = lines.get(1).and_then(|second| capture(&BY_LINE, second)) {
            title = lines.first().map(|first| first.to_string());
            author = Some(by);
        }
    }

    let meta = Metadata { author, title };
    (!meta.is_empty()).then_some(meta)
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines() {
        let text = "The Project Gutenberg eBook\n\nTitle: Moby-Dick; or, The Whale\nAuthor - Herman Melville\n\nRelease date: 2001";
        let meta = parse(text).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Moby-Dick; or, The Whale"));
        assert_eq!(meta.author.as_deref(), Some("Herman Melville"));
    }

    #[test]
    fn test_first_line_with_by_line() {
        let meta = parse("  A Modest Proposal\nby Jonathan Swift\n\nFor preventing...").unwrap();
        assert_eq!(meta.title.as_deref(), Some("A Modest Proposal"));
        assert_eq!(meta.author.as_deref(), Some("Jonathan Swift"));
    }

    #[test]
    fn test_plain_text_has_no_metadata() {
        assert!(parse("shopping list\neggs\nmilk\n").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_header_beyond_first_lines_ignored() {
        let mut text = "line\n".repeat(12);
        text.push_str("Title: Too Late\n");
        assert!(parse(&text).is_none());
    }
}
