//! Change notifications from the store watcher.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A file system change somewhere in the store.
#[derive(Debug, Clone, Serialize)]
pub struct WatchEvent {
    /// The kind of event.
    pub kind: WatchEventKind,

    /// Paths reported by the backend.
    pub paths: Vec<PathBuf>,

    /// When the event was received.
    pub timestamp: DateTime<Utc>,
}

impl WatchEvent {
    /// Create a new watch event.
    pub fn new(kind: WatchEventKind, paths: Vec<PathBuf>) -> Self {
        Self {
            kind,
            paths,
            timestamp: Utc::now(),
        }
    }

    /// Whether the event can change the entry set.
    pub fn triggers_rescan(&self) -> bool {
        self.kind.triggers_rescan()
    }
}

/// Kind of watch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchEventKind {
    /// File or directory was created.
    Created,

    /// File was modified.
    Modified,

    /// File or directory was deleted.
    Deleted,

    /// File was renamed (old path).
    RenamedFrom,

    /// File was renamed (new path).
    RenamedTo,

    /// Metadata changed.
    MetadataChanged,

    /// Access (open, read, close).
    Accessed,

    /// Backend could not classify the event, or asked for a rescan.
    Unknown,
}

impl WatchEventKind {
    /// Reading a secret opens the file; such events leave the index unchanged.
    pub fn triggers_rescan(self) -> bool {
        !matches!(self, Self::Accessed | Self::MetadataChanged)
    }
}

impl From<notify::EventKind> for WatchEventKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => Self::Created,
            notify::EventKind::Modify(modify_kind) => match modify_kind {
                notify::event::ModifyKind::Name(rename) => match rename {
                    notify::event::RenameMode::From => Self::RenamedFrom,
                    notify::event::RenameMode::To => Self::RenamedTo,
                    _ => Self::Modified,
                },
                notify::event::ModifyKind::Metadata(_) => Self::MetadataChanged,
                _ => Self::Modified,
            },
            notify::EventKind::Remove(_) => Self::Deleted,
            notify::EventKind::Access(_) => Self::Accessed,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, MetadataKind, ModifyKind, RemoveKind, RenameMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_conversion() {
        assert_eq!(
            WatchEventKind::from(notify::EventKind::Create(CreateKind::File)),
            WatchEventKind::Created
        );
        assert_eq!(
            WatchEventKind::from(notify::EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            WatchEventKind::RenamedTo
        );
        assert_eq!(
            WatchEventKind::from(notify::EventKind::Remove(RemoveKind::Folder)),
            WatchEventKind::Deleted
        );
        assert_eq!(
            WatchEventKind::from(notify::EventKind::Any),
            WatchEventKind::Unknown
        );
    }

    #[test]
    fn test_access_does_not_trigger_rescan() {
        let read = WatchEvent::new(
            WatchEventKind::from(notify::EventKind::Access(AccessKind::Read)),
            vec![PathBuf::from("/store/bank.gpg")],
        );
        let chmod = WatchEvent::new(
            WatchEventKind::from(notify::EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions,
            ))),
            vec![PathBuf::from("/store/bank.gpg")],
        );
        let removed = WatchEvent::new(WatchEventKind::Deleted, Vec::new());

        assert!(!read.triggers_rescan());
        assert!(!chmod.triggers_rescan());
        assert!(removed.triggers_rescan());
    }
}
