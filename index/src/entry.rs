//! Entries and immutable index snapshots.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File extension that marks an encrypted secret.
pub const SECRET_EXTENSION: &str = "gpg";

/// Separator used inside entry identifiers, independent of the platform.
pub const ENTRY_SEPARATOR: char = '/';

/// One secret in the store, identified by its relative path without the
/// `.gpg` suffix (for example `email/work`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(String);

impl Entry {
    /// Create an entry from an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the entry for `path` relative to `base_dir`.
    ///
    /// Returns `None` when the path is outside the base directory or does not
    /// carry the secret extension.
    pub fn from_store_path(base_dir: &Path, path: &Path) -> Option<Self> {
        if path.extension().and_then(|e| e.to_str()) != Some(SECRET_EXTENSION) {
            return None;
        }
        let relative = path.strip_prefix(base_dir).ok()?.with_extension("");
        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the identifier.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(ENTRY_SEPARATOR)
    }

    /// Whether any segment starts with the OTP marker.
    pub fn is_otp(&self, marker: &str) -> bool {
        !marker.is_empty() && self.segments().any(|segment| segment.starts_with(marker))
    }

    /// Length of the identifier in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Entry {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The full entry set at one instant.
///
/// Snapshots are never mutated after construction; the index swaps in a new
/// one on every rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    entries: BTreeSet<Entry>,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot from a set of entries.
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            built_at: Utc::now(),
        }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Iterate entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Whether the snapshot contains the entry.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.contains(entry)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the snapshot was built.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Compare entry sets, ignoring build time.
    pub fn same_entries(&self, other: &Snapshot) -> bool {
        self.entries == other.entries
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_entry_from_store_path() {
        let base = PathBuf::from("/store");

        let entry = Entry::from_store_path(&base, &base.join("email").join("work.gpg"));
        assert_eq!(entry, Some(Entry::new("email/work")));

        let dotted = Entry::from_store_path(&base, &base.join("site.example.com.gpg"));
        assert_eq!(dotted, Some(Entry::new("site.example.com")));
    }

    #[test]
    fn test_entry_rejects_other_files() {
        let base = PathBuf::from("/store");

        assert_eq!(Entry::from_store_path(&base, &base.join(".gpg-id")), None);
        assert_eq!(Entry::from_store_path(&base, &base.join("notes.txt")), None);
        assert_eq!(Entry::from_store_path(&base, Path::new("/elsewhere/a.gpg")), None);
    }

    #[test]
    fn test_otp_detection() {
        assert!(Entry::new("totp::github").is_otp("totp::"));
        assert!(Entry::new("web/totp::github/code").is_otp("totp::"));
        assert!(!Entry::new("web/github-totp::").is_otp("totp::"));
        assert!(!Entry::new("totp::github").is_otp(""));
    }

    #[test]
    fn test_snapshot_ordering_and_dedup() {
        let snapshot = Snapshot::new(["b", "a", "b"].map(Entry::from));

        let ids: Vec<_> = snapshot.iter().map(Entry::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_serializes_build_time() {
        let snapshot = Snapshot::new([Entry::from("bank")]);

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["entries"], serde_json::json!(["bank"]));
        let built_at = value["built_at"].as_str().unwrap();
        assert_eq!(
            DateTime::parse_from_rfc3339(built_at).unwrap(),
            snapshot.built_at()
        );
    }
}
