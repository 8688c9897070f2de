//! Timed clipboard hand-off.
//!
//! [`ClipboardManager::place`] writes a secret and arms a one-shot clear.
//! There is at most one armed clear at a time; placing a new value aborts the
//! previous timer, and a timer only acts while its generation is current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{Result, RunnerError};

/// Shared clipboard access.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents.
    fn set_text(&self, text: &str) -> Result<()>;

    /// Current text contents, `None` when the clipboard holds no text.
    fn text(&self) -> Result<Option<Zeroizing<String>>>;
}

/// The desktop clipboard, via `arboard`.
pub struct SystemClipboard {
    inner: StdMutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// Connect to the desktop clipboard.
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new().map_err(|e| RunnerError::Clipboard(e.to_string()))?;
        Ok(Self {
            inner: StdMutex::new(clipboard),
        })
    }

    fn with<T>(
        &self,
        f: impl FnOnce(&mut arboard::Clipboard) -> std::result::Result<T, arboard::Error>,
    ) -> Result<T> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| RunnerError::Clipboard("clipboard lock poisoned".to_string()))?;
        f(&mut clipboard).map_err(|e| RunnerError::Clipboard(e.to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        self.with(|clipboard| clipboard.set_text(text))
    }

    fn text(&self) -> Result<Option<Zeroizing<String>>> {
        self.with(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(Some(Zeroizing::new(text))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e),
        })
    }
}

/// In-process clipboard for headless hosts and tests.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: StdMutex<Zeroizing<String>>,
    writes: AtomicU64,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .map(|contents| contents.as_str().to_string())
            .unwrap_or_default()
    }

    /// Number of writes so far, clears included.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| RunnerError::Clipboard("clipboard lock poisoned".to_string()))?;
        *contents = Zeroizing::new(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn text(&self) -> Result<Option<Zeroizing<String>>> {
        let contents = self
            .contents
            .lock()
            .map_err(|_| RunnerError::Clipboard("clipboard lock poisoned".to_string()))?;
        Ok(Some(contents.clone()))
    }
}

/// The armed clear.
struct PendingClear {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

struct Inner {
    clipboard: Arc<dyn Clipboard>,
    pending: Mutex<Option<PendingClear>>,
    next_generation: AtomicU64,
    settled: Notify,
}

/// Places secrets on the clipboard and erases them after a timeout.
#[derive(Clone)]
pub struct ClipboardManager {
    inner: Arc<Inner>,
}

impl ClipboardManager {
    /// Create a manager over `clipboard`.
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            inner: Arc::new(Inner {
                clipboard,
                pending: Mutex::new(None),
                next_generation: AtomicU64::new(1),
                settled: Notify::new(),
            }),
        }
    }

    /// Write `value` now and clear it after `timeout`.
    ///
    /// Supersedes any clear armed by an earlier call. If the write fails, the
    /// earlier clear stays armed and the clipboard is left as it was.
    pub async fn place(&self, value: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now()
            .checked_add(timeout)
            .ok_or(RunnerError::ClipTimeout(timeout))?;

        let mut pending = self.inner.pending.lock().await;
        self.inner.clipboard.set_text(value)?;

        if let Some(previous) = pending.take() {
            previous.handle.abort();
            debug!("Superseded clipboard clear #{}", previous.generation);
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let placed = Zeroizing::new(value.to_string());
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner.expire(generation, &placed).await;
        });

        *pending = Some(PendingClear {
            generation,
            deadline,
            handle,
        });
        debug!("Armed clipboard clear #{generation} in {timeout:?}");
        Ok(())
    }

    /// Clear immediately if a clear is armed. Returns whether it was.
    pub async fn clear_now(&self) -> Result<bool> {
        let mut pending = self.inner.pending.lock().await;
        let Some(previous) = pending.take() else {
            return Ok(false);
        };
        previous.handle.abort();
        let result = self.inner.clipboard.set_text("");
        self.inner.settled.notify_waiters();
        result?;
        info!("Clipboard cleared");
        Ok(true)
    }

    /// When the armed clear fires, if any.
    pub async fn pending_deadline(&self) -> Option<Instant> {
        self.inner.pending.lock().await.as_ref().map(|p| p.deadline)
    }

    /// Wait until no clear is armed.
    pub async fn settle(&self) {
        loop {
            let settled = self.inner.settled.notified();
            if self.inner.pending.lock().await.is_none() {
                return;
            }
            settled.await;
        }
    }
}

impl Inner {
    /// Timer body: clear if still current and still holding our value.
    async fn expire(&self, generation: u64, placed: &str) {
        let mut pending = self.pending.lock().await;
        if pending.as_ref().map(|p| p.generation) != Some(generation) {
            return;
        }
        *pending = None;

        let still_ours = match self.clipboard.text() {
            Ok(current) => current.is_some_and(|text| text.as_str() == placed),
            Err(e) => {
                debug!("Could not read clipboard before clearing: {e}");
                true
            }
        };

        if still_ours {
            match self.clipboard.set_text("") {
                Ok(()) => info!("Clipboard cleared after timeout"),
                Err(e) => warn!("Failed to clear clipboard: {e}"),
            }
        } else {
            debug!("Clipboard changed since placement, leaving it alone");
        }
        self.settled.notify_waiters();
    }
}
