//! Filesystem primitives with an elevated fallback
//!
//! Every operation first runs as the current user. Any failure is reported
//! as a warning and retried exactly once through the elevation wrapper; only
//! the elevated failure is fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use unityup_errors::{Error, InstallError, PlatformError};
use unityup_events::{EventEmitter, EventSender, FailureContext, PlatformEvent};

use crate::elevation::{Elevation, FileOp};
use crate::process::{CommandOutput, PlatformCommand, ProcessRunner};

/// Move/copy/delete with one elevated retry on failure
#[derive(Clone)]
pub struct PrivilegedFileOps {
    runner: Arc<dyn ProcessRunner>,
    elevation: Elevation,
    events: Option<EventSender>,
}

impl std::fmt::Debug for PrivilegedFileOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivilegedFileOps")
            .field("elevation", &self.elevation)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for PrivilegedFileOps {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl PrivilegedFileOps {
    pub fn new(runner: Arc<dyn ProcessRunner>, elevation: Elevation) -> Self {
        Self {
            runner,
            elevation,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// The runner used for elevated retries and installer commands
    #[must_use]
    pub fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.runner
    }

    #[must_use]
    pub fn elevation(&self) -> Elevation {
        self.elevation
    }

    /// Move `source` to `destination`.
    ///
    /// The destination must not exist; callers check that up front and
    /// report `DestinationExists` themselves. Across volumes the move is a
    /// copy followed by a delete of the source; a partial copy is removed
    /// before the elevated retry, and a complete copy whose source could not
    /// be removed only has the source deleted elevated.
    ///
    /// # Errors
    ///
    /// Fails with `ElevationFailure` if the elevated retry exits non-zero,
    /// `InsufficientPrivilege` if elevation is disabled, `DestinationExists`
    /// if something occupies the destination when the elevated move would
    /// run, or `Cancelled`.
    pub async fn move_path(
        &self,
        source: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        check_cancel(cancel)?;
        self.ensure_parent(destination, cancel).await?;

        match move_as_user(source, destination).await {
            Ok(()) => {}
            Err(UserMoveError::SourceRemains(e)) => {
                // The destination is already complete
                self.report_retry("move", source, &e);
                self.retry_elevated(&FileOp::Delete { path: source }, cancel)
                    .await?;
            }
            Err(UserMoveError::NotMoved { error, partial_copy }) => {
                self.report_retry("move", source, &error);
                if partial_copy {
                    self.retry_elevated(&FileOp::Delete { path: destination }, cancel)
                        .await?;
                }
                // mv and Move-Item would nest the source inside an existing directory
                if path_exists(destination).await {
                    return Err(InstallError::DestinationExists {
                        path: destination.display().to_string(),
                    }
                    .into());
                }
                let op = FileOp::Move {
                    source,
                    destination,
                };
                self.retry_elevated(&op, cancel).await?;
            }
        }

        tracing::debug!(from = %source.display(), to = %destination.display(), "moved");
        Ok(())
    }

    /// Recursively copy `source` to `destination`
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::move_path`].
    pub async fn copy_path(
        &self,
        source: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        check_cancel(cancel)?;
        self.ensure_parent(destination, cancel).await?;

        if let Err(e) = copy_recursive(source, destination).await {
            self.report_retry("copy", source, &e);
            // A partial copy may already occupy the destination, so directories
            // are merged in by content instead of copied as a whole
            let op = if is_dir(source).await {
                FileOp::CopyContents {
                    source,
                    destination,
                }
            } else {
                FileOp::Copy {
                    source,
                    destination,
                }
            };
            self.retry_elevated(&op, cancel).await?;
        }
        Ok(())
    }

    /// Remove `path` and everything under it.
    ///
    /// A path that does not exist is already deleted: returns `Ok` without
    /// attempting anything, elevated or not.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::move_path`].
    pub async fn delete_path(&self, path: &Path, cancel: &CancellationToken) -> Result<(), Error> {
        check_cancel(cancel)?;
        if !path_exists(path).await {
            return Ok(());
        }

        if let Err(e) = delete_as_user(path).await {
            self.report_retry("delete", path, &e);
            self.retry_elevated(&FileOp::Delete { path }, cancel)
                .await?;
        }
        Ok(())
    }

    /// Create `path` and its parents
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::move_path`].
    pub async fn create_dir(&self, path: &Path, cancel: &CancellationToken) -> Result<(), Error> {
        check_cancel(cancel)?;
        if let Err(e) = fs::create_dir_all(path).await {
            self.report_retry("create_dir", path, &e);
            self.retry_elevated(&FileOp::CreateDir { path }, cancel)
                .await?;
        }
        Ok(())
    }

    /// Make sure the parent directory of `path` exists
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_dir`].
    pub async fn ensure_parent(&self, path: &Path, cancel: &CancellationToken) -> Result<(), Error> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !path_exists(parent).await => {
                self.create_dir(parent, cancel).await
            }
            _ => Ok(()),
        }
    }

    /// Run an arbitrary command elevated and require a zero exit code.
    ///
    /// Used by installers that must write into protected locations.
    ///
    /// # Errors
    ///
    /// Fails with `ElevationFailure` carrying the command's stderr.
    pub async fn run_elevated(
        &self,
        operation: &str,
        cmd: PlatformCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, Error> {
        let target = cmd.program().to_string();
        let wrapped = self.elevation.wrap(operation, cmd)?;
        self.run_wrapped(operation, Path::new(&target), wrapped, cancel)
            .await
    }

    /// Run `cmd` as the current user; on a non-zero exit, retry it once
    /// elevated.
    ///
    /// # Errors
    ///
    /// Fails if the command cannot be spawned, or as [`Self::run_elevated`].
    pub async fn run_with_fallback(
        &self,
        operation: &str,
        cmd: PlatformCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, Error> {
        let output = self.runner.run(cmd.clone(), cancel).await?;
        if output.success() {
            return Ok(output);
        }

        tracing::warn!(
            operation,
            command = %cmd,
            exit_code = output.exit_code,
            "retrying with elevated rights"
        );
        self.emit_platform(PlatformEvent::ElevationRetry {
            operation: operation.to_string(),
            path: cmd.program().to_string(),
            reason: format!("exited with {}: {}", output.exit_code, output.stderr.trim()),
        });
        check_cancel(cancel)?;
        self.run_elevated(operation, cmd, cancel).await
    }

    async fn retry_elevated(&self, op: &FileOp<'_>, cancel: &CancellationToken) -> Result<(), Error> {
        check_cancel(cancel)?;
        let cmd = self.elevation.command_for(op)?;
        self.run_wrapped(op.name(), op.target(), cmd, cancel)
            .await
            .map(|_| ())
    }

    async fn run_wrapped(
        &self,
        operation: &str,
        target: &Path,
        cmd: PlatformCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, Error> {
        let display = cmd.to_string();
        let output = self.runner.run(cmd, cancel).await?;
        if output.success() {
            return Ok(output);
        }

        let err = PlatformError::ElevationFailure {
            operation: operation.to_string(),
            command: display,
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        };
        self.emit_platform(PlatformEvent::ElevationFailed {
            operation: operation.to_string(),
            path: target.display().to_string(),
            failure: FailureContext::from_error(&err),
        });
        Err(err.into())
    }

    fn report_retry(&self, operation: &str, path: &Path, err: &std::io::Error) {
        tracing::warn!(operation, path = %path.display(), error = %err, "retrying with elevated rights");
        self.emit_platform(PlatformEvent::ElevationRetry {
            operation: operation.to_string(),
            path: path.display().to_string(),
            reason: err.to_string(),
        });
    }
}

fn check_cancel(cancel: &CancellationToken) -> Result<(), Error> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Whether anything (including a dangling symlink) exists at `path`
async fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

async fn is_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// How far a user-level move got before it failed
enum UserMoveError {
    /// The source is untouched; `partial_copy` is set when a partial copy
    /// could not be cleared from the destination
    NotMoved {
        error: std::io::Error,
        partial_copy: bool,
    },
    /// The destination holds a complete copy but the source could not be
    /// removed
    SourceRemains(std::io::Error),
}

async fn move_as_user(source: &Path, destination: &Path) -> Result<(), UserMoveError> {
    let rename_err = match fs::rename(source, destination).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if rename_err.kind() != std::io::ErrorKind::CrossesDevices {
        return Err(UserMoveError::NotMoved {
            error: rename_err,
            partial_copy: false,
        });
    }

    if let Err(copy_err) = copy_recursive(source, destination).await {
        let mut partial_copy = false;
        if path_exists(destination).await {
            if let Err(e) = delete_as_user(destination).await {
                tracing::warn!(path = %destination.display(), error = %e, "failed to remove partial copy");
                partial_copy = true;
            }
        }
        return Err(UserMoveError::NotMoved {
            error: copy_err,
            partial_copy,
        });
    }
    delete_as_user(source)
        .await
        .map_err(UserMoveError::SourceRemains)
}

async fn delete_as_user(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path).await?;
    if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    }
}

/// Copy a file or directory tree, preserving symlinks on Unix
async fn copy_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), destination.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        let metadata = fs::symlink_metadata(&src).await?;
        let file_type = metadata.file_type();

        if file_type.is_symlink() {
            copy_symlink(&src, &dst).await?;
        } else if file_type.is_dir() {
            fs::create_dir_all(&dst).await?;
            let mut entries = fs::read_dir(&src).await?;
            while let Some(entry) = entries.next_entry().await? {
                pending.push((entry.path(), dst.join(entry.file_name())));
            }
        } else {
            fs::copy(&src, &dst).await?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    let target = fs::read_link(src).await?;
    fs::symlink(target, dst).await
}

#[cfg(not(unix))]
async fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::copy(src, dst).await.map(|_| ())
}
