//! Privilege checks for the current process

use tokio_util::sync::CancellationToken;

use crate::process::{PlatformCommand, ProcessRunner};

/// Whether the effective uid is root. Always false off Unix.
#[must_use]
pub fn effective_uid_is_root() -> bool {
    #[cfg(unix)]
    {
        #[allow(unsafe_code)]
        // SAFETY: geteuid has no preconditions and cannot fail
        let euid = unsafe { libc::geteuid() };
        euid == 0
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// Windows check: `net session` only succeeds from an elevated shell
pub async fn net_session_succeeds(runner: &dyn ProcessRunner, cancel: &CancellationToken) -> bool {
    match runner
        .run(PlatformCommand::new("net").arg("session"), cancel)
        .await
    {
        Ok(output) => output.success(),
        Err(e) => {
            tracing::debug!(error = %e, "privilege check failed");
            false
        }
    }
}

/// Whether the current process already runs with administrative rights
pub async fn is_privileged(runner: &dyn ProcessRunner, cancel: &CancellationToken) -> bool {
    if cfg!(windows) {
        net_session_succeeds(runner, cancel).await
    } else {
        effective_uid_is_root()
    }
}
