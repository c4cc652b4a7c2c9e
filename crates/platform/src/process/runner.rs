//! tokio-backed process runner with event emission

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use unityup_errors::{Error, PlatformError};
use unityup_events::{EventEmitter, EventSender, PlatformEvent};

use super::{CommandOutput, PlatformCommand, ProcessRunner};

/// Runs commands with `tokio::process`, awaiting exit without blocking
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    events: Option<EventSender>,
}

impl TokioProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }
}

impl EventEmitter for TokioProcessRunner {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        cmd: PlatformCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let start = Instant::now();
        self.emit_platform(PlatformEvent::ProcessExecutionStarted {
            command: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            elevated: false,
        });

        let child = cmd
            .to_tokio()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let err = PlatformError::ProcessExecutionFailed {
                    command: cmd.to_string(),
                    message: e.to_string(),
                };
                self.emit_platform(PlatformEvent::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    error: e.to_string(),
                });
                err
            })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|e| {
                PlatformError::ProcessExecutionFailed {
                    command: cmd.to_string(),
                    message: e.to_string(),
                }
            })?,
            () = cancel.cancelled() => {
                tracing::debug!(command = %cmd, "stopped waiting for command after cancellation");
                return Err(Error::Cancelled);
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        self.emit_platform(PlatformEvent::ProcessExecutionCompleted {
            command: cmd.program().to_string(),
            exit_code,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        });

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
