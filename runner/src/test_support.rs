//! Doubles shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use passrunner_index::Entry;

use crate::config::ToolCommand;
use crate::decrypt::{DecryptOutput, Decryptor};
use crate::error::{Result, RunnerError};
use crate::notification::Notifier;

/// Decryptor returning a fixed exit code and output.
pub struct StaticDecryptor {
    code: Option<i32>,
    stdout: String,
    pub calls: Mutex<Vec<(String, bool)>>,
}

impl StaticDecryptor {
    pub fn new(code: i32, stdout: &str) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Simulates a tool that cannot be started.
    pub fn unavailable() -> Self {
        Self {
            code: None,
            stdout: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Decryptor for StaticDecryptor {
    async fn decrypt(&self, tool: &ToolCommand, entry: &Entry, otp: bool) -> Result<DecryptOutput> {
        self.calls.lock().unwrap().push((entry.to_string(), otp));
        match self.code {
            Some(code) => Ok(DecryptOutput::new(Some(code), self.stdout.clone())),
            None => Err(RunnerError::Spawn {
                program: tool.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

/// Notifier recording every call.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn copied(&self, entry: &Entry, action: Option<&str>, timeout_secs: u64) {
        self.events
            .lock()
            .unwrap()
            .push(format!("copied {entry} {action:?} {timeout_secs}"));
    }

    fn show_contents(&self, entry: &Entry, contents: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("show {entry} {contents:?}"));
    }
}
