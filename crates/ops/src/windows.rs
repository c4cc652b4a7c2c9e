//! Windows adapter: `.exe`, `.msi`, `.zip` and `.po` artifacts under
//! `C:\Program Files`

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use unityup_config::{fixed_paths::windows, Config};
use unityup_errors::Error;
use unityup_events::EventSender;
use unityup_install::{resolve_package_destination, InstallationFinder, PackageInstaller};
use unityup_platform::{net_session_succeeds, PlatformCommand, PrivilegedFileOps, ProcessRunner};
use unityup_types::{InstallQueue, Installation, PackageFileType, PackageItem};

use crate::adapter::{
    install_translation, installer_failed, require_artifact, run_installer_tool, OsDefaults,
    PlatformCore,
};
use crate::discovery::DirectoryScanFinder;
use crate::platform::{Platform, RunMode, RunOutcome};

const DEFAULTS: OsDefaults = OsDefaults {
    canonical: windows::CANONICAL_PATH,
    install_root: windows::INSTALL_ROOT,
    executable_subpath: windows::EXECUTABLE_SUBPATH,
    localization_subpath: windows::LOCALIZATION_SUBPATH,
};

/// Runs NSIS and MSI installers silently and unpacks zips with the bundled
/// `tar`
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsInstaller;

impl WindowsInstaller {
    /// The command line that installs `item` into `destination`
    fn command(item: &PackageItem, destination: &Path) -> Option<PlatformCommand> {
        let file = item.path.to_string_lossy();
        let destination = destination.to_string_lossy();
        match item.file_type {
            PackageFileType::Exe => Some(
                PlatformCommand::new(file)
                    .arg("/S")
                    .arg(format!("/D={destination}")),
            ),
            PackageFileType::Msi => Some(
                PlatformCommand::new("msiexec")
                    .arg("/i")
                    .arg(file)
                    .arg("/qn")
                    .arg(format!("TARGETDIR={destination}")),
            ),
            PackageFileType::Zip => Some(
                PlatformCommand::new("tar")
                    .arg("-xf")
                    .arg(file)
                    .arg("-C")
                    .arg(destination),
            ),
            _ => None,
        }
    }
}

#[async_trait]
impl PackageInstaller for WindowsInstaller {
    fn supports(&self, file_type: &PackageFileType) -> bool {
        matches!(
            file_type,
            PackageFileType::Exe | PackageFileType::Msi | PackageFileType::Zip | PackageFileType::Po
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

        if item.file_type == PackageFileType::Po {
            return install_translation(item, root, DEFAULTS.localization_subpath, file_ops, cancel)
                .await;
        }

        let destination = resolve_package_destination(item, root, "");
        let Some(cmd) = Self::command(item, &destination) else {
            return Err(installer_failed(
                item,
                Error::internal(format!("{} is not installable on Windows", item.file_type)),
            ));
        };

        if item.file_type == PackageFileType::Zip {
            file_ops.create_dir(&destination, cancel).await?;
        }
        run_installer_tool(item, file_ops, cmd, cancel).await?;
        Ok(())
    }
}

/// Windows platform adapter
pub struct WindowsPlatform {
    core: PlatformCore,
    installer: WindowsInstaller,
    finder: DirectoryScanFinder,
}

impl WindowsPlatform {
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
            installer: WindowsInstaller,
            finder,
        }
    }
}

#[async_trait]
impl Platform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn is_installing(&self) -> bool {
        self.core.transaction.is_active()
    }

    async fn is_privileged(&self, cancel: &CancellationToken) -> bool {
        net_session_succeeds(self.core.runner.as_ref(), cancel).await
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
