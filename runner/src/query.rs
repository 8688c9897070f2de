//! Host-side query pre-processing.

/// Keyword that invokes the runner explicitly (`pass`, `pass bank`).
pub const QUERY_KEYWORD: &str = "pass";

/// Decides which queries reach the matcher and with what text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Minimum length of a query without the keyword.
    pub min_length: usize,
}

impl QueryPolicy {
    /// Create a policy.
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Text to match for `query`, or `None` when the query should be ignored.
    ///
    /// `pass` alone lists everything; `pass <text>` matches `<text>`, trimmed,
    /// with no minimum length. Other queries are matched as typed and must be
    /// at least `min_length` long.
    pub fn prepare<'a>(&self, query: &'a str) -> Option<&'a str> {
        if query == QUERY_KEYWORD {
            return Some("");
        }
        if let Some(rest) = query
            .strip_prefix(QUERY_KEYWORD)
            .and_then(|rest| rest.strip_prefix(' '))
        {
            if !rest.is_empty() {
                return Some(rest.trim());
            }
        }

        (query.chars().count() >= self.min_length).then_some(query)
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_QUERY_LENGTH)
    }
}
