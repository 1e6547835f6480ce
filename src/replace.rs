use anyhow::{Result, bail};

/// Ordered set of literal find/replace pairs. Pairs compose sequentially:
/// each pair runs against the text produced by the previous one, so a later
/// find-string may match text an earlier pair introduced.
#[derive(Debug, Clone, Default)]
pub struct ReplacementSet {
    pairs: Vec<(String, String)>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(find: &str, with: &str) -> Result<Self> {
        let mut set = Self::new();
        set.push(find, with)?;
        Ok(set)
    }

    /// An empty find-string would match everywhere; reject it up front,
    /// before any remote call is made on its behalf.
    pub fn push(&mut self, find: &str, with: &str) -> Result<()> {
        if find.is_empty() {
            bail!("find text cannot be empty");
        }
        self.pairs.push((find.to_string(), with.to_string()));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Literal substitution, no side effects. `changed` is true iff the
    /// result differs from the input.
    pub fn apply(&self, text: &str) -> (String, bool) {
        let mut result = text.to_string();
        for (find, with) in &self.pairs {
            result = result.replace(find.as_str(), with);
        }
        let changed = result != text;
        (result, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_a_no_op() {
        let set = ReplacementSet::new();
        let (result, changed) = set.apply("anything at all");
        assert_eq!(result, "anything at all");
        assert!(!changed);
    }

    #[test]
    fn empty_find_is_rejected() {
        let mut set = ReplacementSet::new();
        assert!(set.push("", "x").is_err());
        assert!(ReplacementSet::single("", "").is_err());
    }

    #[test]
    fn empty_replacement_deletes_the_find_text() {
        let set = ReplacementSet::single("spam ", "").expect("valid pair");
        let (result, changed) = set.apply("spam eggs spam ham");
        assert_eq!(result, "eggs ham");
        assert!(changed);
    }

    #[test]
    fn unchanged_text_reports_no_change() {
        let set = ReplacementSet::single("missing", "present").expect("valid pair");
        let (result, changed) = set.apply("nothing to see");
        assert_eq!(result, "nothing to see");
        assert!(!changed);
    }

    #[test]
    fn pairs_compose_sequentially_in_insertion_order() {
        let mut set = ReplacementSet::new();
        set.push("cat", "dog").expect("valid pair");
        set.push("dog", "bird").expect("valid pair");
        // The second pair sees the first pair's output, so "cat" ends up
        // as "bird" rather than "dog".
        let (result, changed) = set.apply("one cat, one dog");
        assert_eq!(result, "one bird, one bird");
        assert!(changed);
    }

    #[test]
    fn saturated_text_stops_changing() {
        let set = ReplacementSet::single("http://", "https://").expect("valid pair");
        let (once, changed_once) = set.apply("visit http://example.com");
        assert!(changed_once);
        let (twice, changed_twice) = set.apply(&once);
        assert_eq!(once, twice);
        assert!(!changed_twice);
    }

    #[test]
    fn replacement_containing_the_find_text_never_saturates() {
        let set = ReplacementSet::single("a", "aa").expect("valid pair");
        let (once, changed_once) = set.apply("a");
        assert_eq!(once, "aa");
        assert!(changed_once);
        let (twice, changed_twice) = set.apply(&once);
        assert_eq!(twice, "aaaa");
        assert!(changed_twice);
    }
}
