use serde::{Deserialize, Serialize};

/// An owned (subject, predicate, object) record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A triple borrowed from a store; only valid while the store is borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripleRef<'a> {
    pub subject: &'a str,
    pub predicate: &'a str,
    pub object: &'a str,
}

impl TripleRef<'_> {
    pub fn to_triple(&self) -> Triple {
        Triple::new(self.subject, self.predicate, self.object)
    }
}

/// Triple pattern; an empty term matches any value in that position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Pattern matching every triple.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<&str> { bound(&self.subject) }
    pub fn predicate(&self) -> Option<&str> { bound(&self.predicate) }
    pub fn object(&self) -> Option<&str> { bound(&self.object) }

    /// Concrete terms in S, P, O order (`None` = wildcard).
    pub fn terms(&self) -> [Option<&str>; 3] {
        [self.subject(), self.predicate(), self.object()]
    }

    pub fn is_wildcard(&self) -> bool {
        self.terms().iter().all(Option::is_none)
    }

    pub fn matches(&self, triple: &TripleRef<'_>) -> bool {
        let values = [triple.subject, triple.predicate, triple.object];
        self.terms()
            .iter()
            .zip(values)
            .all(|(want, got)| want.map_or(true, |w| w == got))
    }
}

fn bound(term: &str) -> Option<&str> {
    if term.is_empty() { None } else { Some(term) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t<'a>(s: &'a str, p: &'a str, o: &'a str) -> TripleRef<'a> {
        TripleRef { subject: s, predicate: p, object: o }
    }

    #[test]
    fn empty_terms_are_wildcards() {
        let pat = TriplePattern::new("a", "", "c");
        assert_eq!(pat.terms(), [Some("a"), None, Some("c")]);
        assert!(pat.matches(&t("a", "anything", "c")));
        assert!(!pat.matches(&t("a", "b", "d")));
        assert!(!pat.matches(&t("x", "b", "c")));
    }

    #[test]
    fn any_matches_everything() {
        let pat = TriplePattern::any();
        assert!(pat.is_wildcard());
        assert!(pat.matches(&t("x", "y", "z")));
        assert!(!TriplePattern::new("", "", "o").is_wildcard());
    }

    #[test]
    fn borrowed_triple_converts_to_owned() {
        let owned = t("s", "p", "o").to_triple();
        assert_eq!(owned, Triple::new("s", "p", "o"));
    }

    #[test]
    fn pattern_json_shape() {
        let pat: TriplePattern =
            serde_json::from_str(r#"{"subject":"a","predicate":"","object":""}"#).unwrap();
        assert_eq!(pat, TriplePattern::new("a", "", ""));
    }
}
