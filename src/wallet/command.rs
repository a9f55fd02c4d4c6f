//! Signer backed by an external program.
//!
//! The message is written to the program's stdin and the signature is read
//! from its stdout. A non-zero exit, empty output or timeout counts as the
//! user declining to sign.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::Signer;
use crate::error::{LedgerError, Result};

pub struct CommandSigner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSigner {
    /// Returns `None` when `command` is empty
    pub fn new(command: Vec<String>, timeout: Duration) -> Option<Self> {
        let mut parts = command.into_iter();
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }
}

#[async_trait::async_trait]
impl Signer for CommandSigner {
    async fn sign_message(&self, message: &str) -> Result<String> {
        let mut child = TokioCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                LedgerError::Config(format!("failed to start signer '{}': {e}", self.program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A signer may exit without reading its input
            if let Err(e) = stdin.write_all(message.as_bytes()).await
                && e.kind() != ErrorKind::BrokenPipe
            {
                return Err(e.into());
            }
        }

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(program = %self.program, "signer timed out");
                return Err(LedgerError::UserRejected(format!(
                    "no signature after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("signer exited with {}", output.status)
            } else {
                stderr
            };
            return Err(LedgerError::UserRejected(reason));
        }

        let signature = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if signature.is_empty() {
            return Err(LedgerError::UserRejected(
                "signer returned no signature".to_string(),
            ));
        }
        Ok(signature)
    }
}
