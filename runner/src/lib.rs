//! # Password Store Runner
//!
//! This crate ties the store index and the action registry to a retrieval
//! pipeline:
//!
//! - **Configuration**: Environment overrides over a persisted TOML settings file
//! - **Retrieval**: Out-of-process decryption, extraction and clipboard hand-off
//! - **Clipboard**: Timed auto-clear that never clobbers a newer value
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           PassRunner                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  LiveIndex   │  │    Action    │  │ RunnerConfig │           │
//! │  │ (snapshots)  │  │   Registry   │  │  (snapshot)  │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! │         │                │                  │                   │
//! │         ▼                └────────┬─────────┘                   │
//! │   match_entries                   ▼                             │
//! │                          ┌──────────────┐                       │
//! │                          │  Retrieval   │──► Notifier           │
//! │                          │   Pipeline   │                       │
//! │                          └──────────────┘                       │
//! │                                 │                               │
//! │                                 ▼                               │
//! │                          ┌──────────────┐                       │
//! │                          │  Clipboard   │                       │
//! │                          │   Manager    │                       │
//! │                          └──────────────┘                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use passrunner_core::{PassRunner, RunnerConfig};
//!
//! let runner = PassRunner::with_defaults(RunnerConfig::load(None)?)?;
//! runner.start().await?;
//!
//! let matches = runner.matches("pass bank").await;
//! let outcome = runner.run(matches[0].entry.clone(), None).await?.await?;
//! ```

pub mod clipboard;
pub mod config;
pub mod decrypt;
pub mod engine;
pub mod error;
pub mod notification;
pub mod pipeline;
pub mod query;

#[cfg(test)]
mod test_support;

pub use clipboard::{Clipboard, ClipboardManager, MemoryClipboard, SystemClipboard};
pub use config::{RunnerConfig, Settings, ToolCommand};
pub use decrypt::{DecryptOutput, Decryptor, PassTool};
pub use engine::PassRunner;
pub use error::{Result, RunnerError};
pub use notification::{LogNotifier, Notifier, copied_message};
pub use pipeline::{RetrievalOutcome, RetrievalPipeline, RetrievalRequest};
pub use query::{QUERY_KEYWORD, QueryPolicy};

// Re-export from dependencies for convenience
pub use passrunner_actions::{Action, ActionDefinition, ActionRegistry, ExtractionError};
pub use passrunner_index::{Entry, IndexStats, Match, Relevance, Snapshot};
