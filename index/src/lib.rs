//! # Password Store Index
//!
//! This crate keeps a live, queryable index of the secrets in a password
//! store directory.
//!
//! ## Features
//!
//! - **Atomic Snapshots**: Readers always see a complete entry set
//! - **Directory Watching**: Every store directory is registered with the
//!   watch backend; registrations follow the tree as it changes
//! - **Burst Coalescing**: Queued change notifications collapse into one rescan
//! - **Query Matching**: Case-insensitive substring matching with exact/partial relevance
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Password Store Index                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  NotifyWatch ──► WatchEvent ──► LiveIndex ──► EntryIndex        │
//! │       ▲                            │              │             │
//! │       └────────── WatchSet ◄───────┘              ▼             │
//! │                                     Snapshot ──► match_entries  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod entry;
pub mod error;
pub mod event;
pub mod indexer;
pub mod query;
pub mod watcher;

pub use entry::{ENTRY_SEPARATOR, Entry, SECRET_EXTENSION, Snapshot};
pub use error::{IndexError, Result};
pub use event::{WatchEvent, WatchEventKind};
pub use indexer::{EntryIndex, IndexStats, ScanResult, scan_store};
pub use query::{Match, Relevance, match_entries};
pub use watcher::{DirectoryWatch, LiveIndex, NotifyWatch, WatchDelta, WatchSet};
