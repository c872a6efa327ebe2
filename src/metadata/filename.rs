use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::Metadata;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._]+").expect("valid regex"));
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").expect("valid regex"));
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(microsoft word|documento?\d*|scan|img\s?\d+|page\s?\d+)\b").expect("valid regex")
});
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Guesses author and title from a filename such as
/// `"Herbert, Frank - Dune [retail].epub"`.
///
/// Only dash-separated names are trusted. With two parts, a side holding a
/// `"Last, First"` comma is the author, then a side of at most three words
/// facing a longer one; otherwise the first part is.
pub fn guess_from_filename(path: &Path) -> Option<Metadata> {
    let stem = path.file_stem()?.to_str()?;
    let cleaned = clean(stem);

    let parts: Vec<&str> = cleaned.split('-').map(str::trim).filter(|p| !p.is_empty()).collect();
    let (author, title) = match parts.as_slice() {
        [] | [_] => return None,
        [left, right] => {
            if author_side_is_right(left, right) {
                (*right, (*left).to_string())
            } else {
                (*left, (*right).to_string())
            }
        }
        [first, rest @ ..] => (*first, rest.join(" ")),
    };

    Some(Metadata {
        author: Some(author.to_string()),
        title: Some(title),
    })
}

fn author_side_is_right(left: &str, right: &str) -> bool {
    match (left.contains(','), right.contains(',')) {
        (false, true) => return true,
        (true, _) => return false,
        _ => {}
    }
    let (left_words, right_words) = (left.split_whitespace().count(), right.split_whitespace().count());
    let left_is_name = left_words <= 3 && right_words > 1;
    let right_is_name = right_words <= 3 && left_words > 1;
    right_is_name && !left_is_name
}

fn clean(stem: &str) -> String {
    let text = SEPARATORS.replace_all(stem, " ");
    let text = text.replace(['\u{2014}', '\u{2013}'], "-");
    let text = BRACKETED.replace_all(&text, " ");
    let text = NOISE.replace_all(&text, " ");
    let text = SPACES.replace_all(&text, " ");
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.' | ','))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(name: &str) -> Option<(String, String)> {
        guess_from_filename(Path::new(name)).map(|m| (m.author.unwrap(), m.title.unwrap()))
    }

    #[test]
    fn test_author_first() {
        assert_eq!(guess("Frank_Herbert - Dune Messiah.pdf"), Some(("Frank Herbert".into(), "Dune Messiah".into())));
    }

    #[test]
    fn test_author_second() {
        assert_eq!(
            guess("The Name of the Wind \u{2013} Patrick Rothfuss (2007).epub"),
            Some(("Patrick Rothfuss".into(), "The Name of the Wind".into()))
        );
    }

    #[test]
    fn test_comma_marks_author() {
        assert_eq!(guess("Dune - Herbert, Frank [retail].epub"), Some(("Herbert, Frank".into(), "Dune".into())));
    }

    #[test]
    fn test_more_parts() {
        assert_eq!(guess("Asimov - Foundation - Book 1.txt"), Some(("Asimov".into(), "Foundation Book 1".into())));
    }

    #[test]
    fn test_no_dash() {
        assert_eq!(guess("scan_0001.pdf"), None);
        assert_eq!(guess("notes.txt"), None);
    }
}
