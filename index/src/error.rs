//! Error types for the entry index.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while indexing or watching the store.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The blocking scan task panicked or was cancelled.
    #[error("scan task failed: {0}")]
    ScanTask(#[from] tokio::task::JoinError),

    /// Channel send error.
    #[error("channel error: failed to send event")]
    ChannelSend,
}
