//! Linux adapter: tarballs, zips and `.po` files under `/opt`

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use unityup_config::{fixed_paths::linux, Config};
use unityup_errors::Error;
use unityup_events::EventSender;
use unityup_install::{resolve_package_destination, InstallationFinder, PackageInstaller};
use unityup_platform::{effective_uid_is_root, PlatformCommand, PrivilegedFileOps, ProcessRunner};
use unityup_types::{InstallQueue, Installation, PackageFileType, PackageItem};

use crate::adapter::{
    install_translation, installer_failed, require_artifact, run_installer_tool, OsDefaults,
    PlatformCore,
};
use crate::discovery::DirectoryScanFinder;
use crate::platform::{Platform, RunMode, RunOutcome};

const DEFAULTS: OsDefaults = OsDefaults {
    canonical: linux::CANONICAL_PATH,
    install_root: linux::INSTALL_ROOT,
    executable_subpath: linux::EXECUTABLE_SUBPATH,
    localization_subpath: linux::LOCALIZATION_SUBPATH,
};

/// Unpacks archives with `tar` and `unzip`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxInstaller;

#[async_trait]
impl PackageInstaller for LinuxInstaller {
    fn supports(&self, file_type: &PackageFileType) -> bool {
        matches!(
            file_type,
            PackageFileType::TarXz
                | PackageFileType::TarGz
                | PackageFileType::Zip
                | PackageFileType::Po
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

        let file = item.path.to_string_lossy();
        let destination = resolve_package_destination(item, root, "");
        let cmd = match item.file_type {
            PackageFileType::TarXz | PackageFileType::TarGz => PlatformCommand::new("tar")
                .arg("-xf")
                .arg(file)
                .arg("-C")
                .arg(destination.to_string_lossy()),
            PackageFileType::Zip => PlatformCommand::new("unzip")
                .args(["-q", "-o"])
                .arg(file)
                .arg("-d")
                .arg(destination.to_string_lossy()),
            PackageFileType::Po => {
                return install_translation(
                    item,
                    root,
                    DEFAULTS.localization_subpath,
                    file_ops,
                    cancel,
                )
                .await;
            }
            ref other => {
                return Err(installer_failed(
                    item,
                    Error::internal(format!("{other} is not installable on Linux")),
                ));
            }
        };

        file_ops.create_dir(&destination, cancel).await?;
        run_installer_tool(item, file_ops, cmd, cancel).await?;
        Ok(())
    }
}

/// Linux platform adapter
pub struct LinuxPlatform {
    core: PlatformCore,
    installer: LinuxInstaller,
    finder: DirectoryScanFinder,
}

impl LinuxPlatform {
    #[must_use]
    pub fn new(
        config: &Config,
        runner: Arc<dyn ProcessRunner>,
        events: Option<EventSender>,
    ) -> Self {
        let core = PlatformCore::new(config, DEFAULTS, runner, events);
        let finder = DirectoryScanFinder::new(core.search_roots.clone(), DEFAULTS.executable_subpath);
        Self {
            core,
            installer: LinuxInstaller,
            finder,
        }
    }
}

#[async_trait]
impl Platform for LinuxPlatform {
    fn name(&self) -> &'static str {
        "linux"
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
