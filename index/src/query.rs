//! Query matching over a snapshot.

use serde::Serialize;

use crate::entry::{Entry, Snapshot};

/// How well an entry matches a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    /// The query spans the whole identifier.
    Exact,

    /// The query is a strict substring of the identifier.
    Partial,
}

/// One entry matching a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// The matching entry.
    pub entry: Entry,

    /// Exact or partial.
    pub relevance: Relevance,
}

/// Return every entry of `snapshot` containing `query`, ignoring case.
///
/// Results follow snapshot order. An empty query matches everything.
pub fn match_entries(snapshot: &Snapshot, query: &str) -> Vec<Match> {
    let needle = query.to_lowercase();
    let query_len = query.chars().count();

    snapshot
        .iter()
        .filter(|entry| entry.as_str().to_lowercase().contains(&needle))
        .map(|entry| Match {
            entry: entry.clone(),
            relevance: if query_len == entry.char_len() {
                Relevance::Exact
            } else {
                Relevance::Partial
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(ids: &[&str]) -> Snapshot {
        Snapshot::new(ids.iter().copied().map(Entry::from))
    }

    #[test]
    fn test_partial_and_exact() {
        let snapshot = snapshot(&["bank", "email/work"]);

        assert_eq!(
            match_entries(&snapshot, "wor"),
            vec![Match {
                entry: Entry::new("email/work"),
                relevance: Relevance::Partial,
            }]
        );
        assert_eq!(
            match_entries(&snapshot, "bank"),
            vec![Match {
                entry: Entry::new("bank"),
                relevance: Relevance::Exact,
            }]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let snapshot = snapshot(&["Social/GitHub"]);

        let matches = match_entries(&snapshot, "social/github");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].relevance, Relevance::Exact);
    }

    #[test]
    fn test_empty_query_matches_all() {
        let snapshot = snapshot(&["a", "b/c"]);

        let matches = match_entries(&snapshot, "");

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.relevance == Relevance::Partial));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let snapshot = snapshot(&["a.b", "axb"]);

        let matches = match_entries(&snapshot, "a.b");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].entry, Entry::new("a.b"));
    }

    #[test]
    fn test_no_match() {
        assert!(match_entries(&snapshot(&["bank"]), "mail").is_empty());
    }
}
