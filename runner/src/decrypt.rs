//! Out-of-process decryption.

use std::process::Stdio;

use async_trait::async_trait;
use passrunner_index::Entry;
use tokio::process::Command;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::ToolCommand;
use crate::error::{Result, RunnerError};

/// Exit status and captured standard output of one decryption.
pub struct DecryptOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,

    /// Decrypted plaintext; wiped on drop.
    pub stdout: Zeroizing<String>,
}

impl DecryptOutput {
    /// Create an output.
    pub fn new(code: Option<i32>, stdout: impl Into<String>) -> Self {
        Self {
            code,
            stdout: Zeroizing::new(stdout.into()),
        }
    }

    /// Whether the tool exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Debug for DecryptOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptOutput")
            .field("code", &self.code)
            .field("stdout", &"<redacted>")
            .finish()
    }
}

/// Something that can decrypt a store entry.
#[async_trait]
pub trait Decryptor: Send + Sync {
    /// Decrypt `entry` with `tool`, using the OTP sub-command when `otp`.
    ///
    /// A non-zero exit is an `Ok` output; `Err` means the tool never ran.
    async fn decrypt(&self, tool: &ToolCommand, entry: &Entry, otp: bool) -> Result<DecryptOutput>;
}

/// Runs the configured tool as `<program> <args..> [otp] show <entry>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassTool;

impl PassTool {
    /// Arguments following the program name.
    pub fn arguments(tool: &ToolCommand, entry: &Entry, otp: bool) -> Vec<String> {
        let mut args = tool.args.clone();
        if otp {
            args.push("otp".to_string());
        }
        args.push("show".to_string());
        args.push(entry.as_str().to_string());
        args
    }
}

#[async_trait]
impl Decryptor for PassTool {
    async fn decrypt(&self, tool: &ToolCommand, entry: &Entry, otp: bool) -> Result<DecryptOutput> {
        let args = Self::arguments(tool, entry, otp);
        debug!("Running {} for {entry} (otp: {otp})", tool.program);

        let output = Command::new(&tool.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: tool.program.clone(),
                source,
            })?;

        let raw = Zeroizing::new(output.stdout);
        if !output.stderr.is_empty() {
            debug!(
                "{} stderr: {}",
                tool.program,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }

        Ok(DecryptOutput {
            code: output.status.code(),
            stdout: Zeroizing::new(String::from_utf8_lossy(&raw).into_owned()),
        })
    }
}
