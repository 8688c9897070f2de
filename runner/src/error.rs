//! Error types for the runner.

use thiserror::Error;

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors that can occur in the runner.
///
/// Query and retrieval paths never hand these to the host; they are logged
/// and degrade to empty results or no-ops.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Index error.
    #[error("index error: {0}")]
    Index(#[from] passrunner_index::IndexError),

    /// Action error.
    #[error("action error: {0}")]
    Action(#[from] passrunner_actions::ActionError),

    /// Settings file could not be parsed.
    #[error("failed to parse settings {path}: {source}")]
    SettingsParse {
        /// Settings file.
        path: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    /// Decryption tool could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Clipboard access failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Auto-clear timeout too large to schedule.
    #[error("clipboard timeout out of range: {0:?}")]
    ClipTimeout(std::time::Duration),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
