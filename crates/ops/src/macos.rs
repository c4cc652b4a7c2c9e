//! macOS adapter: `.pkg`, `.dmg`, `.zip` and `.po` artifacts under
//! `/Applications`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use unityup_config::{fixed_paths::macos, Config};
use unityup_errors::Error;
use unityup_events::EventSender;
use unityup_install::{resolve_package_destination, InstallationFinder, PackageInstaller};
use unityup_platform::{effective_uid_is_root, PlatformCommand, PrivilegedFileOps, ProcessRunner};
use unityup_types::{InstallQueue, Installation, PackageFileType, PackageItem};

use crate::adapter::{
    install_translation, installer_failed, require_artifact, run_installer_tool, OsDefaults,
    PlatformCore,
};
use crate::discovery::MacOSFinder;
use crate::platform::{Platform, RunMode, RunOutcome};

const DEFAULTS: OsDefaults = OsDefaults {
    canonical: macos::CANONICAL_PATH,
    install_root: macos::INSTALL_ROOT,
    executable_subpath: macos::EXECUTABLE_SUBPATH,
    localization_subpath: macos::LOCALIZATION_SUBPATH,
};

/// Installs macOS artifacts through `installer`, `pkgutil`, `hdiutil` and
/// `ditto`
#[derive(Clone)]
pub struct MacOSInstaller {
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for MacOSInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacOSInstaller").finish_non_exhaustive()
    }
}

impl MacOSInstaller {
    #[must_use]
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    async fn install_pkg(
        &self,
        item: &PackageItem,
        root: &Path,
        file_ops: &PrivilegedFileOps,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        // The editor package's own install location is the default canonical
        // path; anywhere else its payload is copied in by hand
        if item.is_editor() && root == Path::new(DEFAULTS.canonical) {
            let cmd = PlatformCommand::new("installer")
                .arg("-pkg")
                .arg(item.path.to_string_lossy())
                .args(["-target", "/"]);
            run_installer_tool(item, file_ops, cmd, cancel).await?;
            return Ok(());
        }

        let scratch = tempfile::tempdir()?;
        let expanded = scratch.path().join("expanded");
        let cmd = PlatformCommand::new("pkgutil")
            .arg("--expand-full")
            .arg(item.path.to_string_lossy())
            .arg(expanded.to_string_lossy());
        self.runner
            .run_checked(cmd, cancel)
            .await
            .map_err(|e| installer_failed(item, e))?;

        let payload = find_payload(&expanded).await.ok_or_else(|| {
            installer_failed(item, Error::internal("package has no Payload directory"))
        })?;

        let destination = resolve_package_destination(item, root, "");
        file_ops.create_dir(&destination, cancel).await?;
        copy_children(&payload, &destination, file_ops, cancel).await
    }

    async fn install_dmg(
        &self,
        item: &PackageItem,
        root: &Path,
        file_ops: &PrivilegedFileOps,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let scratch = tempfile::tempdir()?;
        let mountpoint = scratch.path().join("mount");
        let attach = PlatformCommand::new("hdiutil")
            .arg("attach")
            .arg(item.path.to_string_lossy())
            .args(["-nobrowse", "-readonly", "-mountpoint"])
            .arg(mountpoint.to_string_lossy());
        self.runner
            .run_checked(attach, cancel)
            .await
            .map_err(|e| installer_failed(item, e))?;

        let result = copy_bundles(item, &mountpoint, root, file_ops, cancel).await;

        // Detach even when the copy was cancelled
        let detach = PlatformCommand::new("hdiutil")
            .arg("detach")
            .arg(mountpoint.to_string_lossy())
            .arg("-force");
        if let Err(e) = self
            .runner
            .run_checked(detach, &CancellationToken::new())
            .await
        {
            tracing::warn!(mountpoint = %mountpoint.display(), error = %e, "failed to detach disk image");
        }

        result
    }
}

#[async_trait]
impl PackageInstaller for MacOSInstaller {
    fn supports(&self, file_type: &PackageFileType) -> bool {
        matches!(
            file_type,
            PackageFileType::Pkg | PackageFileType::Dmg | PackageFileType::Zip | PackageFileType::Po
        )
    }

    async fn install(
        &self,
        item: &PackageItem,
        root: &Path,
        file_ops: &PrivilegedFileOps,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        require_artifact(item).await?;

        match &item.file_type {
            PackageFileType::Pkg => self.install_pkg(item, root, file_ops, cancel).await,
            PackageFileType::Dmg => self.install_dmg(item, root, file_ops, cancel).await,
            PackageFileType::Zip => {
                let destination = resolve_package_destination(item, root, "");
                file_ops.create_dir(&destination, cancel).await?;
                let cmd = PlatformCommand::new("ditto")
                    .args(["-x", "-k"])
                    .arg(item.path.to_string_lossy())
                    .arg(destination.to_string_lossy());
                run_installer_tool(item, file_ops, cmd, cancel).await?;
                Ok(())
            }
            PackageFileType::Po => {
                install_translation(item, root, DEFAULTS.localization_subpath, file_ops, cancel)
                    .await
            }
            other => Err(installer_failed(
                item,
                Error::internal(format!("{other} is not installable on macOS")),
            )),
        }
    }
}

/// `Payload` directly under the expansion, or inside its first component
/// package
async fn find_payload(expanded: &Path) -> Option<PathBuf> {
    let direct = expanded.join("Payload");
    if is_dir(&direct).await {
        return Some(direct);
    }

    let mut entries = tokio::fs::read_dir(expanded).await.ok()?;
    let mut nested = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let payload = entry.path().join("Payload");
        if is_dir(&payload).await {
            nested.push(payload);
        }
    }
    nested.sort();
    nested.into_iter().next()
}

async fn copy_bundles(
    item: &PackageItem,
    mountpoint: &Path,
    root: &Path,
    file_ops: &PrivilegedFileOps,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let destination = resolve_package_destination(item, root, "");
    file_ops.create_dir(&destination, cancel).await?;

    let mut entries = tokio::fs::read_dir(mountpoint)
        .await
        .map_err(|e| Error::io_with_path(&e, mountpoint))?;
    let mut copied = 0usize;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, mountpoint))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "app") {
            file_ops
                .copy_path(&path, &destination.join(entry.file_name()), cancel)
                .await?;
            copied += 1;
        }
    }

    if copied == 0 {
        return Err(installer_failed(
            item,
            Error::internal("disk image contains no application bundle"),
        ));
    }
    Ok(())
}

async fn copy_children(
    source: &Path,
    destination: &Path,
    file_ops: &PrivilegedFileOps,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let mut entries = tokio::fs::read_dir(source)
        .await
        .map_err(|e| Error::io_with_path(&e, source))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, source))?
    {
        file_ops
            .copy_path(&entry.path(), &destination.join(entry.file_name()), cancel)
            .await?;
    }
    Ok(())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// macOS platform adapter
pub struct MacOSPlatform {
    core: PlatformCore,
    installer: MacOSInstaller,
    finder: MacOSFinder,
}

impl MacOSPlatform {
    #[must_use]
    pub fn new(
        config: &Config,
        runner: Arc<dyn ProcessRunner>,
        events: Option<EventSender>,
    ) -> Self {
        let core = PlatformCore::new(config, DEFAULTS, runner.clone(), events);
        let finder = MacOSFinder::new(core.search_roots.clone());
        Self {
            core,
            installer: MacOSInstaller::new(runner),
            finder,
        }
    }
}

#[async_trait]
impl Platform for MacOSPlatform {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn is_installing(&self) -> bool {
        self.core.transaction.is_active()
    }

    async fn is_privileged(&self, _cancel: &CancellationToken) -> bool {
        effective_uid_is_root()
    }

    async fn find_installations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Installation>, Error> {
        self.finder.find_installations(cancel).await
    }

    async fn prepare(
        &mut self,
        queue: &InstallQueue,
        templates: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.core.prepare(queue, templates, &self.finder, cancel).await
    }

    async fn install_package(
        &mut self,
        item: &PackageItem,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.core
            .install_package(item, &self.installer, cancel)
            .await
    }

    async fn complete(
        &mut self,
        aborted: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Installation>, Error> {
        self.core.complete(aborted, cancel).await
    }

    async fn move_installation(
        &self,
        installation: &Installation,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<Installation, Error> {
        self.core
            .move_installation(installation, destination, cancel)
            .await
    }

    async fn uninstall(
        &self,
        installation: &Installation,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.core.uninstall(installation, cancel).await
    }

    async fn run(
        &self,
        installation: &Installation,
        args: &[String],
        mode: RunMode,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, Error> {
        self.core.run(installation, args, mode, cancel).await
    }
}
