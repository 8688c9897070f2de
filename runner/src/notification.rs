//! User-facing notifications about retrievals.

use passrunner_index::Entry;
use tracing::info;

/// Receives the user-visible side effects of a retrieval.
pub trait Notifier: Send + Sync {
    /// A value from `entry` was placed on the clipboard.
    fn copied(&self, entry: &Entry, action: Option<&str>, timeout_secs: u64);

    /// The full decrypted contents of `entry` should be displayed.
    fn show_contents(&self, entry: &Entry, contents: &str);
}

/// Text announcing a clipboard copy.
pub fn copied_message(entry: &Entry, action: Option<&str>, timeout_secs: u64) -> String {
    match action {
        Some(action) => {
            format!("{action} of {entry} copied to clipboard for {timeout_secs} seconds")
        }
        None => format!("Password {entry} copied to clipboard for {timeout_secs} seconds"),
    }
}

/// Notifier that emits tracing events. Contents are never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn copied(&self, entry: &Entry, action: Option<&str>, timeout_secs: u64) {
        info!("{}", copied_message(entry, action, timeout_secs));
    }

    fn show_contents(&self, entry: &Entry, contents: &str) {
        info!(
            "Contents of {entry} ready for display ({} lines)",
            contents.lines().count()
        );
    }
}
