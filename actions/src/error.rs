//! Error types for actions and extraction.

use thiserror::Error;

/// Result type alias for action operations.
pub type Result<T> = std::result::Result<T, ActionError>;

/// Errors that can occur while looking up actions.
#[derive(Error, Debug)]
pub enum ActionError {
    /// Action not found.
    #[error("action not found: {0}")]
    NotFound(String),
}

/// An extraction pattern that yielded nothing for an entry.
///
/// This is a configuration problem, reported to the user and never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("pattern {pattern:?} (valid: {valid}) did not match the contents of {entry}")]
pub struct ExtractionError {
    /// The configured pattern.
    pub pattern: String,

    /// Whether the pattern compiled.
    pub valid: bool,

    /// Entry whose contents were searched.
    pub entry: String,
}
