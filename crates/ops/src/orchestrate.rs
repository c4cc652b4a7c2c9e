//! High-level flows built on [`Platform`]

use tokio_util::sync::CancellationToken;
use unityup_config::fixed_paths::LOG_FILE_FLAG;
use unityup_errors::{Error, PlatformError};
use unityup_platform::Elevation;
use unityup_types::{InstallQueue, Installation};

use crate::platform::Platform;

/// Install every package in `queue` as one transaction.
///
/// On any failure, including cancellation, the transaction is completed as
/// aborted so the canonical location is restored, and the original error is
/// returned. A failure during that cleanup is only logged.
///
/// # Errors
///
/// Returns the first error from prepare, a package install or completion.
pub async fn install_queue<P: Platform + ?Sized>(
    platform: &mut P,
    queue: &InstallQueue,
    templates: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Installation, Error> {
    let result = run_queue(platform, queue, templates, cancel).await;

    if let Err(e) = &result {
        if platform.is_installing() {
            tracing::warn!(version = %queue.version, error = %e, "install failed, rolling back");
            // The caller's token may already be cancelled; cleanup must still run
            if let Err(cleanup) = platform.complete(true, &CancellationToken::new()).await {
                tracing::error!(
                    version = %queue.version,
                    error = %cleanup,
                    "rollback after failed install also failed"
                );
            }
        }
    }

    result
}

async fn run_queue<P: Platform + ?Sized>(
    platform: &mut P,
    queue: &InstallQueue,
    templates: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Installation, Error> {
    platform.prepare(queue, templates, cancel).await?;

    for item in &queue.items {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        platform.install_package(item, cancel).await?;
    }

    platform
        .complete(false, cancel)
        .await?
        .ok_or_else(|| Error::internal("completed install produced no installation"))
}

/// Fail unless the process is privileged or allowed to elevate
///
/// # Errors
///
/// `InsufficientPrivilege` when neither holds.
pub async fn ensure_privileged<P: Platform + ?Sized>(
    platform: &P,
    elevation: Elevation,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    if platform.is_privileged(cancel).await || elevation.is_enabled() {
        return Ok(());
    }
    Err(PlatformError::InsufficientPrivilege {
        operation: "install".to_string(),
        message: format!(
            "{} requires administrative rights and elevation is disabled",
            platform.name()
        ),
    }
    .into())
}

/// Route the editor log to stdout unless the caller chose a log file
pub fn ensure_log_file_flag(args: &mut Vec<String>) {
    if !args.iter().any(|a| a.eq_ignore_ascii_case(LOG_FILE_FLAG)) {
        args.push(LOG_FILE_FLAG.to_string());
        args.push("-".to_string());
    }
}
