//! State and behaviour shared by the OS adapters through composition

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use unityup_config::Config;
use unityup_errors::{Error, InstallError};
use unityup_events::{EventEmitter, EventSender};
use unityup_install::{
    resolve_package_destination, InstallLayout, InstallTransaction, InstallationFinder,
    PackageInstaller,
};
use unityup_platform::{
    run_monitored, spawn_detached, CommandOutput, Elevation, PlatformCommand, PrivilegedFileOps,
    ProcessRunner,
};
use unityup_types::{InstallQueue, Installation, PackageItem};

use crate::orchestrate::ensure_log_file_flag;
use crate::platform::{RunMode, RunOutcome};

/// Fixed locations of one OS
#[derive(Debug, Clone, Copy)]
pub struct OsDefaults {
    pub canonical: &'static str,
    pub install_root: &'static str,
    pub executable_subpath: &'static str,
    pub localization_subpath: &'static str,
}

/// Everything an adapter needs besides its OS-specific installer and finder
pub(crate) struct PlatformCore {
    pub(crate) transaction: InstallTransaction,
    pub(crate) file_ops: PrivilegedFileOps,
    pub(crate) runner: Arc<dyn ProcessRunner>,
    pub(crate) events: Option<EventSender>,
    pub(crate) search_roots: Vec<PathBuf>,
    log_output: bool,
}

impl EventEmitter for PlatformCore {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl PlatformCore {
    pub(crate) fn new(
        config: &Config,
        defaults: OsDefaults,
        runner: Arc<dyn ProcessRunner>,
        events: Option<EventSender>,
    ) -> Self {
        let layout = InstallLayout::new(
            config.canonical_path_or(defaults.canonical),
            defaults.install_root,
            defaults.executable_subpath,
        );

        let mut file_ops =
            PrivilegedFileOps::new(runner.clone(), Elevation::new(config.elevation.method));
        if let Some(tx) = &events {
            file_ops = file_ops.with_events(tx.clone());
        }
        let mut transaction = InstallTransaction::new(layout.clone(), file_ops.clone());
        if let Some(tx) = &events {
            transaction = transaction.with_events(tx.clone());
        }

        let mut search_roots: Vec<PathBuf> = Vec::new();
        let candidates = std::iter::once(PathBuf::from(defaults.install_root))
            .chain(
                layout
                    .canonical
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(Path::to_path_buf),
            )
            .chain(config.install.search_roots.iter().cloned());
        for root in candidates {
            if !search_roots.contains(&root) {
                search_roots.push(root);
            }
        }

        Self {
            transaction,
            file_ops,
            runner,
            events,
            search_roots,
            log_output: config.process.log_output,
        }
    }

    pub(crate) fn layout(&self) -> &InstallLayout {
        self.transaction.layout()
    }

    pub(crate) async fn prepare(
        &mut self,
        queue: &InstallQueue,
        templates: Option<&str>,
        finder: &dyn InstallationFinder,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.transaction
            .prepare(queue, templates, finder, cancel)
            .await
    }

    pub(crate) async fn install_package(
        &mut self,
        item: &PackageItem,
        installer: &dyn PackageInstaller,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.transaction
            .install_package(item, installer, cancel)
            .await
    }

    pub(crate) async fn complete(
        &mut self,
        aborted: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Installation>, Error> {
        self.transaction.complete(aborted, cancel).await
    }

    pub(crate) async fn move_installation(
        &self,
        installation: &Installation,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<Installation, Error> {
        if tokio::fs::symlink_metadata(destination).await.is_ok() {
            return Err(InstallError::DestinationExists {
                path: destination.display().to_string(),
            }
            .into());
        }

        let operation = format!("move {}", installation.version);
        self.emit_operation_started(&operation);
        if let Err(e) = self
            .file_ops
            .move_path(&installation.root, destination, cancel)
            .await
        {
            self.emit_operation_failed(&operation, e.to_string());
            return Err(e);
        }
        self.emit_operation_completed(&operation, true);

        Ok(Installation::new(
            installation.version.clone(),
            destination.to_path_buf(),
            self.layout().executable_in(destination),
        ))
    }

    pub(crate) async fn uninstall(
        &self,
        installation: &Installation,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let operation = format!("uninstall {}", installation.version);
        self.emit_operation_started(&operation);
        if let Err(e) = self.file_ops.delete_path(&installation.root, cancel).await {
            self.emit_operation_failed(&operation, e.to_string());
            return Err(e);
        }
        self.emit_operation_completed(&operation, true);
        Ok(())
    }

    pub(crate) async fn run(
        &self,
        installation: &Installation,
        args: &[String],
        mode: RunMode,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, Error> {
        if tokio::fs::metadata(&installation.executable).await.is_err() {
            return Err(InstallError::ExecutableNotFound {
                path: installation.executable.display().to_string(),
            }
            .into());
        }

        let mut cmd = PlatformCommand::new(installation.executable.to_string_lossy())
            .args(args)
            .current_dir(installation.root.clone());

        match mode {
            RunMode::Detached => {
                let pid = spawn_detached(&cmd, &self.events)?;
                Ok(RunOutcome::Detached { pid })
            }
            RunMode::Monitored => {
                ensure_log_file_flag(cmd.args_mut());
                let code = run_monitored(&cmd, &self.events, self.log_output, cancel).await?;
                Ok(RunOutcome::Exited { code })
            }
        }
    }
}

/// Attribute a tool failure to the package being installed
pub(crate) fn installer_failed(item: &PackageItem, err: Error) -> Error {
    if err.is_cancelled() {
        return err;
    }
    InstallError::InstallerFailed {
        package: item.name.clone(),
        message: err.to_string(),
    }
    .into()
}

/// Fail early when the artifact on disk is gone
pub(crate) async fn require_artifact(item: &PackageItem) -> Result<(), Error> {
    if tokio::fs::metadata(&item.path).await.is_err() {
        return Err(InstallError::InstallerFailed {
            package: item.name.clone(),
            message: format!("{} does not exist", item.path.display()),
        }
        .into());
    }
    Ok(())
}

/// Run an installer tool that writes under the install root
pub(crate) async fn run_installer_tool(
    item: &PackageItem,
    file_ops: &PrivilegedFileOps,
    cmd: PlatformCommand,
    cancel: &CancellationToken,
) -> Result<CommandOutput, Error> {
    tracing::debug!(package = %item.name, command = %cmd, "running installer");
    file_ops
        .run_with_fallback(&format!("install {}", item.name), cmd, cancel)
        .await
}

/// Copy a `.po` translation into the editor's localization directory
pub(crate) async fn install_translation(
    item: &PackageItem,
    root: &Path,
    localization_subpath: &str,
    file_ops: &PrivilegedFileOps,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let dir = resolve_package_destination(item, root, localization_subpath);
    let Some(file_name) = item.path.file_name() else {
        return Err(InstallError::InstallerFailed {
            package: item.name.clone(),
            message: format!("{} has no file name", item.path.display()),
        }
        .into());
    };

    file_ops.create_dir(&dir, cancel).await?;
    file_ops
        .copy_path(&item.path, &dir.join(file_name), cancel)
        .await
}
