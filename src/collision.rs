use std::collections::HashSet;

/// Filenames considered taken during one planning pass.
///
/// Comparison is case-insensitive so that two proposals differing only in
/// case never land on the same file on case-insensitive filesystems.
#[derive(Debug, Clone, Default)]
pub struct ReservationSet {
    names: HashSet<String>,
}

impl ReservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&fold(name))
    }

    /// Returns `false` if the name was already reserved.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.names.insert(fold(name))
    }

    pub fn release(&mut self, name: &str) -> bool {
        self.names.remove(&fold(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReservationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.reserve(name.as_ref());
        }
        set
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive filename equality, matching [`ReservationSet`].
pub fn same_name(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Picks the first free name among `base.ext`, `base (2).ext`, `base (3).ext`, ...
/// and reserves it.
pub fn resolve(base: &str, extension: &str, taken: &mut ReservationSet) -> String {
    let candidate = with_extension(base, extension);
    if taken.reserve(&candidate) {
        return candidate;
    }

    let mut n: u32 = 2;
    loop {
        let candidate = with_extension(&format!("{} ({})", base, n), extension);
        if taken.reserve(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// `stem.extension`, or just `stem` when there is no extension.
pub fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_free_name() {
        let mut taken = ReservationSet::new();
        assert_eq!(resolve("A - T", "pdf", &mut taken), "A - T.pdf");
        assert!(taken.contains("A - T.pdf"));
    }

    #[test]
    fn test_resolve_increments_suffix() {
        let mut taken: ReservationSet = ["A - T.pdf", "A - T (2).pdf"].into_iter().collect();
        assert_eq!(resolve("A - T", "pdf", &mut taken), "A - T (3).pdf");
        assert_eq!(resolve("A - T", "pdf", &mut taken), "A - T (4).pdf");
        assert_eq!(taken.len(), 4);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut taken: ReservationSet = ["a - t.PDF"].into_iter().collect();
        assert_eq!(resolve("A - T", "pdf", &mut taken), "A - T (2).pdf");
    }

    #[test]
    fn test_resolve_never_returns_taken_name() {
        let mut taken = ReservationSet::new();
        let mut seen = Vec::new();
        for _ in 0..20 {
            let name = resolve("Same", "txt", &mut taken);
            assert!(!seen.contains(&name));
            seen.push(name);
        }
        assert_eq!(seen[1], "Same (2).txt");
    }

    #[test]
    fn test_release_frees_name() {
        let mut taken: ReservationSet = ["Book.epub"].into_iter().collect();
        assert!(taken.release("BOOK.EPUB"));
        assert_eq!(resolve("Book", "epub", &mut taken), "Book.epub");
        assert_eq!(resolve("Readme", "", &mut taken), "Readme");
    }
}
