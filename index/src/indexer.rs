//! Store scanning and the shared entry index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::entry::{Entry, Snapshot};
use crate::error::Result;

/// Outcome of one full traversal of the store.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Entries found.
    pub snapshot: Snapshot,

    /// Every directory visited, base directory included.
    pub directories: BTreeSet<PathBuf>,
}

impl ScanResult {
    fn empty() -> Self {
        Self {
            snapshot: Snapshot::empty(),
            directories: BTreeSet::new(),
        }
    }
}

/// Names starting with `.` (`.git`, `.gpg-id`, `.extensions`) are skipped.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Walk `base_dir` and collect every secret file and subdirectory.
///
/// An unreadable base directory produces an empty result; unreadable
/// subtrees are skipped.
pub fn scan_store(base_dir: &Path) -> ScanResult {
    if !base_dir.is_dir() {
        warn!("Password store not accessible: {}", base_dir.display());
        return ScanResult::empty();
    }

    let mut entries = Vec::new();
    let mut directories = BTreeSet::new();

    let walker = WalkDir::new(base_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for item in walker {
        let dir_entry = match item {
            Ok(dir_entry) => dir_entry,
            Err(e) => {
                debug!("Skipping unreadable store path: {e}");
                continue;
            }
        };

        let path = dir_entry.path();
        if dir_entry.file_type().is_dir() {
            directories.insert(path.to_path_buf());
        } else if path.is_file() {
            if let Some(entry) = Entry::from_store_path(base_dir, path) {
                entries.push(entry);
            }
        }
    }

    ScanResult {
        snapshot: Snapshot::new(entries),
        directories,
    }
}

/// Shared index over a password store.
///
/// Readers always observe a complete snapshot; rebuilds scan without holding
/// the snapshot lock and only take the write lock for the swap. Rebuilds run
/// one at a time, so an older scan never replaces a newer one.
pub struct EntryIndex {
    /// Store root.
    base_dir: PathBuf,

    /// Most recently completed snapshot.
    snapshot: RwLock<Arc<Snapshot>>,

    /// Held across scan and swap.
    rebuild_lock: Mutex<()>,
}

impl EntryIndex {
    /// Create an index with an empty snapshot.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The store root.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Rescan the store and publish the new snapshot.
    ///
    /// Returns the full scan result so callers can refresh directory watches.
    pub async fn rebuild(&self) -> Result<ScanResult> {
        let _rebuilding = self.rebuild_lock.lock().await;
        let start = Instant::now();
        let base_dir = self.base_dir.clone();
        let result = tokio::task::spawn_blocking(move || scan_store(&base_dir)).await?;

        let snapshot = Arc::new(result.snapshot.clone());
        let previous = {
            let mut guard = self.snapshot.write().await;
            std::mem::replace(&mut *guard, snapshot)
        };

        info!(
            "Indexed {} entries in {} directories in {:?} (previously {})",
            result.snapshot.len(),
            result.directories.len(),
            start.elapsed(),
            previous.len()
        );

        Ok(result)
    }

    /// The most recently completed snapshot.
    pub async fn current_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Get statistics about the index; `otp_marker` selects OTP entries.
    pub async fn stats(&self, otp_marker: &str) -> IndexStats {
        let snapshot = self.current_snapshot().await;
        IndexStats {
            base_dir: self.base_dir.clone(),
            total_entries: snapshot.len(),
            otp_entries: snapshot.iter().filter(|e| e.is_otp(otp_marker)).count(),
            built_at: snapshot.built_at().to_rfc3339(),
        }
    }
}

/// Statistics about the entry index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Store root.
    pub base_dir: PathBuf,

    /// Number of indexed entries.
    pub total_entries: usize,

    /// Entries that use the OTP sub-command.
    pub otp_entries: usize,

    /// RFC 3339 build time of the current snapshot.
    pub built_at: String,
}
