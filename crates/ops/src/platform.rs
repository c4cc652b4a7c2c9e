//! The operations every OS adapter exposes

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use unityup_errors::Error;
use unityup_types::{InstallQueue, Installation, PackageItem};

/// How to launch an installed editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Start and forget
    Detached,
    /// Wait for exit, forwarding output lines as events
    Monitored,
}

/// Result of launching an editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcome {
    Detached { pid: Option<u32> },
    /// The monitored child exited; the caller should exit with this code
    Exited { code: i32 },
}

/// Install, discover and run editors on one OS.
///
/// `prepare`, `install_package` and `complete` delegate to the adapter's own
/// install transaction and must be called in that order.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Short OS name for logs
    fn name(&self) -> &'static str;

    /// Whether an install transaction is active
    fn is_installing(&self) -> bool;

    /// Whether the current process already has administrative rights
    async fn is_privileged(&self, cancel: &CancellationToken) -> bool;

    /// Editors installed on this machine
    async fn find_installations(&self, cancel: &CancellationToken)
        -> Result<Vec<Installation>, Error>;

    async fn prepare(
        &mut self,
        queue: &InstallQueue,
        templates: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;

    async fn install_package(
        &mut self,
        item: &PackageItem,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;

    async fn complete(
        &mut self,
        aborted: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Installation>, Error>;

    /// Relocate a finished installation; fails if `destination` exists
    async fn move_installation(
        &self,
        installation: &Installation,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<Installation, Error>;

    /// Delete an installation's root
    async fn uninstall(
        &self,
        installation: &Installation,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;

    /// Launch an installed editor
    async fn run(
        &self,
        installation: &Installation,
        args: &[String],
        mode: RunMode,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, Error>;
}
