//! The runner engine: index, registry and pipeline behind one handle.

use std::sync::Arc;

use passrunner_actions::{Action, ActionRegistry};
use passrunner_index::{Entry, EntryIndex, IndexStats, LiveIndex, Match, match_entries};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clipboard::{ClipboardManager, MemoryClipboard, SystemClipboard};
use crate::config::RunnerConfig;
use crate::decrypt::PassTool;
use crate::error::Result;
use crate::notification::{LogNotifier, Notifier};
use crate::pipeline::{RetrievalOutcome, RetrievalPipeline, RetrievalRequest};

/// Password store runner.
///
/// Queries read the latest index snapshot, selections start a retrieval on the
/// pipeline, and a reload swaps configuration and actions wholesale.
pub struct PassRunner {
    /// Current configuration snapshot.
    config: RwLock<Arc<RunnerConfig>>,

    /// Actions offered for every match.
    registry: RwLock<Arc<ActionRegistry>>,

    /// Index over the configured store.
    index: RwLock<Arc<EntryIndex>>,

    /// Watcher task, while started.
    live: Mutex<Option<LiveIndex>>,

    /// Retrieval pipeline.
    pipeline: RetrievalPipeline,
}

impl PassRunner {
    /// Create a runner. The index stays empty until [`start`](Self::start) or
    /// [`refresh`](Self::refresh).
    pub fn new(config: RunnerConfig, pipeline: RetrievalPipeline) -> Self {
        let registry = ActionRegistry::build(&config.actions);
        let index = EntryIndex::new(config.base_dir.clone());

        Self {
            config: RwLock::new(Arc::new(config)),
            registry: RwLock::new(Arc::new(registry)),
            index: RwLock::new(Arc::new(index)),
            live: Mutex::new(None),
            pipeline,
        }
    }

    /// Create a runner using `pass`, the desktop clipboard and `notifier`.
    pub fn with_system(config: RunnerConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let clipboard = ClipboardManager::new(Arc::new(SystemClipboard::new()?));
        let pipeline = RetrievalPipeline::new(Arc::new(PassTool), clipboard, notifier);
        Ok(Self::new(config, pipeline))
    }

    /// Create a runner using `pass` and an in-process clipboard.
    ///
    /// For hosts that only query the index, or have no desktop session.
    pub fn headless(config: RunnerConfig, notifier: Arc<dyn Notifier>) -> Self {
        let clipboard = ClipboardManager::new(Arc::new(MemoryClipboard::new()));
        let pipeline = RetrievalPipeline::new(Arc::new(PassTool), clipboard, notifier);
        Self::new(config, pipeline)
    }

    /// [`with_system`](Self::with_system) with notifications sent to the log.
    pub fn with_defaults(config: RunnerConfig) -> Result<Self> {
        Self::with_system(config, Arc::new(LogNotifier))
    }

    /// Build the index and keep it current while the store changes.
    pub async fn start(&self) -> Result<()> {
        let mut live = self.live.lock().await;
        if live.is_some() {
            debug!("Live index already running");
            return Ok(());
        }

        let index = self.index.read().await.clone();
        *live = Some(LiveIndex::spawn(index).await?);
        Ok(())
    }

    /// Rebuild the index once without watching.
    pub async fn refresh(&self) -> Result<()> {
        let index = self.index.read().await.clone();
        index.rebuild().await?;
        Ok(())
    }

    /// The current configuration snapshot.
    pub async fn config(&self) -> Arc<RunnerConfig> {
        self.config.read().await.clone()
    }

    /// The current action list.
    pub async fn registry(&self) -> Arc<ActionRegistry> {
        self.registry.read().await.clone()
    }

    /// Entries matching a raw query typed by the user.
    ///
    /// The query keyword and minimum length are applied before matching.
    pub async fn matches(&self, query: &str) -> Vec<Match> {
        let policy = self.config.read().await.query.clone();
        let Some(query) = policy.prepare(query) else {
            return Vec::new();
        };

        let snapshot = self.index.read().await.current_snapshot().await;
        let matches = match_entries(&snapshot, query);
        debug!("Query {query:?} matched {} entries", matches.len());
        matches
    }

    /// Actions offered for each match, in configured order.
    pub async fn actions_for_match(&self) -> Vec<Action> {
        self.registry.read().await.as_slice().to_vec()
    }

    /// Start retrieving `entry`, optionally through the action named
    /// `action_name`.
    ///
    /// The action and configuration are captured now; a later reload does not
    /// affect this retrieval.
    pub async fn run(
        &self,
        entry: Entry,
        action_name: Option<&str>,
    ) -> Result<JoinHandle<RetrievalOutcome>> {
        let action = match action_name {
            Some(name) => Some(self.registry.read().await.require(name)?),
            None => None,
        };
        let config = self.config().await;

        debug!(
            "Retrieving {entry} (action: {:?})",
            action.as_ref().map(|a| a.name.as_str())
        );
        Ok(self.pipeline.retrieve(RetrievalRequest {
            entry,
            action,
            config,
        }))
    }

    /// Swap in a new configuration.
    ///
    /// Actions are rebuilt from scratch. When the store moved, the index is
    /// replaced and, if it was live, restarted on the new directory.
    pub async fn reload(&self, config: RunnerConfig) -> Result<()> {
        let registry = ActionRegistry::build(&config.actions);
        let moved = self.config.read().await.base_dir != config.base_dir;

        if moved {
            let index = Arc::new(EntryIndex::new(config.base_dir.clone()));
            let mut live = self.live.lock().await;
            let was_live = match live.take() {
                Some(previous) => {
                    previous.shutdown();
                    true
                }
                None => false,
            };

            *self.index.write().await = index.clone();
            if was_live {
                *live = Some(LiveIndex::spawn(index).await?);
            } else {
                index.rebuild().await?;
            }
            info!("Password store moved to {}", config.base_dir.display());
        }

        *self.registry.write().await = Arc::new(registry);
        *self.config.write().await = Arc::new(config);
        info!("Configuration reloaded");
        Ok(())
    }

    /// Statistics about the current index.
    pub async fn stats(&self) -> IndexStats {
        let otp_marker = self.config.read().await.otp_marker.clone();
        self.index.read().await.stats(&otp_marker).await
    }

    /// The clipboard manager retrievals write to.
    pub fn clipboard(&self) -> &ClipboardManager {
        self.pipeline.clipboard()
    }

    /// Stop watching the store.
    pub async fn shutdown(&self) {
        if let Some(live) = self.live.lock().await.take() {
            live.shutdown();
        }
    }
}
