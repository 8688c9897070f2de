//! Directory watching and the self-refreshing live index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{IndexError, Result};
use crate::event::{WatchEvent, WatchEventKind};
use crate::indexer::EntryIndex;

/// Capacity of the event channel between the watch backend and the index.
///
/// A full channel already guarantees a pending rescan, so overflow is dropped.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Registration interface for a directory-watch backend.
///
/// Each call covers exactly one directory, not its subtree; the index
/// registers every directory it discovers.
pub trait DirectoryWatch: Send {
    /// Start observing `dir`.
    fn watch(&mut self, dir: &Path) -> Result<()>;

    /// Stop observing `dir`.
    fn unwatch(&mut self, dir: &Path) -> Result<()>;
}

/// `notify`-backed watch backend that forwards events onto a channel.
pub struct NotifyWatch {
    watcher: RecommendedWatcher,
}

impl NotifyWatch {
    /// Create a backend delivering relevant events to `event_tx`.
    pub fn new(event_tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let watch_event = WatchEvent::new(WatchEventKind::from(event.kind), event.paths);
                    if !watch_event.triggers_rescan() {
                        return;
                    }
                    match event_tx.try_send(watch_event) {
                        Ok(()) | Err(TrySendError::Full(_)) => {}
                        Err(TrySendError::Closed(_)) => debug!("Index gone, dropping watch event"),
                    }
                }
                Err(e) => {
                    error!("Watch error: {e}");
                }
            },
        )?;

        Ok(Self { watcher })
    }
}

impl DirectoryWatch for NotifyWatch {
    fn watch(&mut self, dir: &Path) -> Result<()> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unwatch(&mut self, dir: &Path) -> Result<()> {
        self.watcher.unwatch(dir)?;
        Ok(())
    }
}

/// Directories added and removed by one [`WatchSet::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchDelta {
    /// Newly registered directories.
    pub added: Vec<PathBuf>,

    /// Directories that vanished and were unregistered.
    pub removed: Vec<PathBuf>,
}

/// Tracks which directories are registered with a backend.
pub struct WatchSet<W> {
    backend: W,
    watched: BTreeSet<PathBuf>,
}

impl<W: DirectoryWatch> WatchSet<W> {
    /// Create an empty watch set over `backend`.
    pub fn new(backend: W) -> Self {
        Self {
            backend,
            watched: BTreeSet::new(),
        }
    }

    /// Make the registrations match `directories` exactly.
    ///
    /// Failed registrations are retried on the next sync. A vanished
    /// directory is forgotten even if the backend already dropped it.
    pub fn sync(&mut self, directories: &BTreeSet<PathBuf>) -> WatchDelta {
        let mut delta = WatchDelta::default();

        let stale: Vec<PathBuf> = self.watched.difference(directories).cloned().collect();
        for dir in stale {
            if let Err(e) = self.backend.unwatch(&dir) {
                debug!("Watch on {} already gone: {e}", dir.display());
            }
            self.watched.remove(&dir);
            delta.removed.push(dir);
        }

        let fresh: Vec<PathBuf> = directories.difference(&self.watched).cloned().collect();
        for dir in fresh {
            match self.backend.watch(&dir) {
                Ok(()) => {
                    self.watched.insert(dir.clone());
                    delta.added.push(dir);
                }
                Err(e) => warn!("Failed to watch {}: {e}", dir.display()),
            }
        }

        if !delta.added.is_empty() || !delta.removed.is_empty() {
            debug!(
                "Watching {} directories (+{} -{})",
                self.watched.len(),
                delta.added.len(),
                delta.removed.len()
            );
        }
        delta
    }

    /// Currently registered directories.
    pub fn watched(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }
}

/// An [`EntryIndex`] kept current by a background rescan task.
pub struct LiveIndex {
    index: Arc<EntryIndex>,
    rescan_tx: mpsc::Sender<WatchEvent>,
    task: JoinHandle<()>,
}

impl LiveIndex {
    /// Build the index and start watching its store with `notify`.
    pub async fn spawn(index: Arc<EntryIndex>) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let backend = NotifyWatch::new(event_tx.clone())?;
        Self::spawn_with(index, backend, event_tx, event_rx).await
    }

    /// Build the index and drive rescans from `event_rx` using `backend`.
    ///
    /// The first snapshot is published before this returns.
    pub async fn spawn_with<W>(
        index: Arc<EntryIndex>,
        backend: W,
        rescan_tx: mpsc::Sender<WatchEvent>,
        mut event_rx: mpsc::Receiver<WatchEvent>,
    ) -> Result<Self>
    where
        W: DirectoryWatch + 'static,
    {
        let mut watches = WatchSet::new(backend);
        refresh(&index, &mut watches, false).await?;
        info!("Watching password store at {}", index.base_dir().display());

        let task_index = index.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let mut coalesced = 1;
                while event_rx.try_recv().is_ok() {
                    coalesced += 1;
                }
                debug!(
                    "Store changed ({:?} {:?}), rescanning after {coalesced} event(s)",
                    event.kind, event.paths
                );

                if let Err(e) = refresh(&task_index, &mut watches, true).await {
                    error!("Failed to rescan password store: {e}");
                }
            }
            debug!("Watch channel closed, live index stopped");
        });

        Ok(Self {
            index,
            rescan_tx,
            task,
        })
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<EntryIndex> {
        &self.index
    }

    /// Queue a rescan as if the watcher had reported a change.
    pub fn request_rescan(&self) -> Result<()> {
        match self
            .rescan_tx
            .try_send(WatchEvent::new(WatchEventKind::Unknown, Vec::new()))
        {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(IndexError::ChannelSend),
        }
    }

    /// Stop the background task and drop the watch backend.
    pub fn shutdown(self) {
        info!("Live index stopped");
    }
}

impl Drop for LiveIndex {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Closest existing directory at or above `base_dir`.
fn watch_anchor(base_dir: &Path) -> Option<PathBuf> {
    base_dir
        .ancestors()
        .find(|dir| dir.is_dir())
        .map(Path::to_path_buf)
}

/// Rebuild and resync watches.
///
/// With `follow_new_dirs`, scanning repeats until no new directory shows up:
/// files created inside a new directory before its watch was registered are
/// picked up by the follow-up scan.
///
/// While the store is missing, its closest existing ancestor is watched
/// instead so that recreating the store triggers a rescan.
async fn refresh<W: DirectoryWatch>(
    index: &EntryIndex,
    watches: &mut WatchSet<W>,
    follow_new_dirs: bool,
) -> Result<()> {
    loop {
        let mut directories = index.rebuild().await?.directories;
        if directories.is_empty() {
            if let Some(anchor) = watch_anchor(index.base_dir()) {
                debug!("Store missing, watching {} for it", anchor.display());
                directories.insert(anchor);
            }
        }

        let delta = watches.sync(&directories);
        if !follow_new_dirs || delta.added.is_empty() {
            return Ok(());
        }
    }
}
