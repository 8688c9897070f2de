//! The decrypt → extract → clip pipeline.
//!
//! A retrieval runs on its own task; the caller gets a handle and is never
//! blocked on the external tool. Every failure is handled here and reported
//! as a [`RetrievalOutcome`].

use std::sync::Arc;

use passrunner_actions::{Action, Extracted, ExtractionError, apply_action};
use passrunner_index::Entry;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clipboard::ClipboardManager;
use crate::config::RunnerConfig;
use crate::decrypt::Decryptor;
use crate::notification::Notifier;

/// A selection to retrieve.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// Selected entry.
    pub entry: Entry,

    /// Selected action; `None` copies the first line.
    pub action: Option<Action>,

    /// Configuration captured at selection time.
    pub config: Arc<RunnerConfig>,
}

/// Terminal state of a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// A value was placed on the clipboard.
    Copied {
        /// Entry retrieved.
        entry: Entry,
        /// Action used, if any.
        action: Option<String>,
    },

    /// The contents were handed to the notifier for display.
    Displayed {
        /// Entry retrieved.
        entry: Entry,
    },

    /// The decrypted file had no non-empty line.
    Empty,

    /// The action's pattern yielded nothing.
    ExtractionFailed(ExtractionError),

    /// The tool exited unsuccessfully.
    ToolFailed {
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
    },

    /// The tool could not be started.
    SpawnFailed(String),

    /// Writing the clipboard failed.
    ClipboardFailed(String),
}

/// Orchestrates retrievals.
#[derive(Clone)]
pub struct RetrievalPipeline {
    decryptor: Arc<dyn Decryptor>,
    clipboard: ClipboardManager,
    notifier: Arc<dyn Notifier>,
}

impl RetrievalPipeline {
    /// Create a pipeline.
    pub fn new(
        decryptor: Arc<dyn Decryptor>,
        clipboard: ClipboardManager,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            decryptor,
            clipboard,
            notifier,
        }
    }

    /// The clipboard manager results are handed to.
    pub fn clipboard(&self) -> &ClipboardManager {
        &self.clipboard
    }

    /// Start a retrieval in the background.
    pub fn retrieve(&self, request: RetrievalRequest) -> JoinHandle<RetrievalOutcome> {
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.run(request).await })
    }

    /// Run a retrieval to completion on the current task.
    pub async fn run(&self, request: RetrievalRequest) -> RetrievalOutcome {
        let RetrievalRequest {
            entry,
            action,
            config,
        } = request;
        let otp = entry.is_otp(&config.otp_marker);

        let output = match self.decryptor.decrypt(&config.tool, &entry, otp).await {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to decrypt {entry}: {e}");
                return RetrievalOutcome::SpawnFailed(e.to_string());
            }
        };

        if !output.success() {
            debug!("Decryption of {entry} exited with {:?}", output.code);
            return RetrievalOutcome::ToolFailed { code: output.code };
        }

        let action_name = action.as_ref().map(|a| a.name.clone());
        match apply_action(action.as_ref(), &output.stdout, entry.as_str()) {
            Ok(Extracted::Contents(contents)) => {
                self.notifier.show_contents(&entry, contents);
                RetrievalOutcome::Displayed { entry }
            }
            Ok(Extracted::Value(value)) => {
                if let Err(e) = self.clipboard.place(value, config.clip_timeout()).await {
                    error!("Failed to copy {entry} to clipboard: {e}");
                    return RetrievalOutcome::ClipboardFailed(e.to_string());
                }
                info!("Copied {entry} to clipboard (action: {action_name:?})");
                self.notifier
                    .copied(&entry, action_name.as_deref(), config.clip_timeout_secs);
                RetrievalOutcome::Copied {
                    entry,
                    action: action_name,
                }
            }
            Ok(Extracted::Empty) => {
                warn!("Decrypted {entry} has no password line");
                RetrievalOutcome::Empty
            }
            Err(diagnostic) => {
                warn!("{diagnostic}");
                RetrievalOutcome::ExtractionFailed(diagnostic)
            }
        }
    }
}
