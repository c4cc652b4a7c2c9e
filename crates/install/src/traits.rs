//! Collaborators the transaction delegates to

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use unityup_errors::Error;
use unityup_platform::PrivilegedFileOps;
use unityup_types::{Installation, PackageFileType, PackageItem};

/// Installs one package artifact into an install root.
///
/// Implementations are per-OS and dispatch on [`PackageFileType`].
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Whether this installer can handle the artifact kind
    fn supports(&self, file_type: &PackageFileType) -> bool;

    /// Install `item` into `root` (the canonical install location)
    async fn install(
        &self,
        item: &PackageItem,
        root: &Path,
        file_ops: &PrivilegedFileOps,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;
}

/// Enumerates the editors installed on this machine
#[async_trait]
pub trait InstallationFinder: Send + Sync {
    async fn find_installations(&self, cancel: &CancellationToken)
        -> Result<Vec<Installation>, Error>;
}
