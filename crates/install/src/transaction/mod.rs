//! Install transaction state machine
//!
//! `prepare` → `install_package` (once per queued item) → `complete`.
//! At most one transaction is active per [`InstallTransaction`]; the state
//! lives in an `Option` that `complete` always takes, so every exit path
//! returns to idle.

mod state;

pub use state::{InstallLayout, TransactionPhase, TransactionState};

use std::path::Path;
use tokio_util::sync::CancellationToken;
use unityup_errors::{Error, InstallError, UserFacingError};
use unityup_events::{EventEmitter, EventSender, FailureContext, TransactionEvent};
use unityup_platform::PrivilegedFileOps;
use unityup_types::{InstallQueue, Installation, PackageItem};

use crate::path::resolve_unique_install_path;
use crate::traits::{InstallationFinder, PackageInstaller};

/// Coordinates relocation of existing installs around package installation
#[derive(Debug)]
pub struct InstallTransaction {
    layout: InstallLayout,
    file_ops: PrivilegedFileOps,
    state: Option<TransactionState>,
    events: Option<EventSender>,
}

impl EventEmitter for InstallTransaction {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

impl InstallTransaction {
    #[must_use]
    pub fn new(layout: InstallLayout, file_ops: PrivilegedFileOps) -> Self {
        Self {
            layout,
            file_ops,
            state: None,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    #[must_use]
    pub fn file_ops(&self) -> &PrivilegedFileOps {
        &self.file_ops
    }

    /// The active transaction, if any
    #[must_use]
    pub fn state(&self) -> Option<&TransactionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Start a transaction for `queue`.
    ///
    /// Parks an installation found at the canonical location, and for
    /// module-only queues moves the matching installation into the canonical
    /// location so installers can add to it.
    ///
    /// # Errors
    ///
    /// - `AlreadyInstalling` if a transaction is active (state untouched)
    /// - `InvalidQueue` if the queue is empty or the editor is not first
    /// - `VersionNotInstalled` for a module-only queue without a matching install
    /// - `FallbackPathOccupied` if something must be parked but the spot is taken
    /// - file operation errors from the relocations
    pub async fn prepare(
        &mut self,
        queue: &InstallQueue,
        templates: Option<&str>,
        finder: &dyn InstallationFinder,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if let Some(active) = &self.state {
            return Err(InstallError::AlreadyInstalling {
                version: active.version.to_string(),
            }
            .into());
        }
        if queue.items.is_empty() {
            return Err(InstallError::InvalidQueue {
                message: "no packages to install".to_string(),
            }
            .into());
        }
        queue
            .validate()
            .map_err(|message| InstallError::InvalidQueue { message })?;

        let mut state = TransactionState::new(queue.version.clone(), templates.map(str::to_string));

        // Look up the upgrade target before touching the filesystem
        let upgrade_root = if queue.includes_editor() {
            None
        } else {
            let installations = finder.find_installations(cancel).await?;
            let existing = installations
                .into_iter()
                .find(|installation| installation.version.matches(&queue.version))
                .ok_or_else(|| InstallError::VersionNotInstalled {
                    version: queue.version.to_string(),
                })?;
            Some(existing.root)
        };

        let canonical = self.layout.canonical.clone();
        let fallback = self.layout.fallback.clone();
        let upgrading_in_place = upgrade_root.as_deref() == Some(canonical.as_path());

        if !upgrading_in_place && exists(&canonical).await {
            if exists(&fallback).await {
                return Err(InstallError::FallbackPathOccupied {
                    canonical: canonical.display().to_string(),
                    fallback: fallback.display().to_string(),
                }
                .into());
            }
            self.file_ops.move_path(&canonical, &fallback, cancel).await?;
            state.moved_existing = true;
            self.emit_relocated(&state, &canonical, &fallback);
        }

        if let Some(original) = upgrade_root {
            if !upgrading_in_place {
                if let Err(e) = self.file_ops.move_path(&original, &canonical, cancel).await {
                    if state.moved_existing {
                        self.restore_parked(&state).await?;
                    }
                    return Err(e);
                }
                self.emit_relocated(&state, &original, &canonical);
            }
            state.upgrade_original_path = Some(original);
        }

        self.emit_transaction(TransactionEvent::Prepared {
            id: state.id,
            version: state.version.to_string(),
            upgrade: state.is_upgrade(),
        });
        tracing::debug!(id = %state.id, version = %state.version, "transaction prepared");
        self.state = Some(state);
        Ok(())
    }

    /// Install one queued package into the canonical location.
    ///
    /// # Errors
    ///
    /// - `NoActiveTransaction` without a prior `prepare`
    /// - `EditorNotInstalledFirst` for a module before the editor (fresh installs)
    /// - `UnsupportedPackageType` if `installer` cannot handle the artifact
    /// - whatever the installer reports
    pub async fn install_package(
        &mut self,
        item: &PackageItem,
        installer: &dyn PackageInstaller,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let state = self.state.as_ref().ok_or(InstallError::NoActiveTransaction)?;
        let id = state.id;

        if !item.is_editor() && !state.accepts_modules() {
            return Err(InstallError::EditorNotInstalledFirst {
                package: item.name.clone(),
            }
            .into());
        }
        if !installer.supports(&item.file_type) {
            return Err(InstallError::UnsupportedPackageType {
                package: item.name.clone(),
                file_type: item.file_type.to_string(),
            }
            .into());
        }

        self.emit_transaction(TransactionEvent::PackageStarted {
            id,
            package: item.name.clone(),
            file_type: item.file_type.to_string(),
        });

        installer
            .install(item, &self.layout.canonical, &self.file_ops, cancel)
            .await?;

        if let Some(state) = self.state.as_mut() {
            state.phase = TransactionPhase::Installing;
            if item.is_editor() {
                state.main_installed = true;
            }
        }
        self.emit_transaction(TransactionEvent::PackageCompleted {
            id,
            package: item.name.clone(),
        });
        Ok(())
    }

    /// Finish the active transaction.
    ///
    /// Not aborted: the canonical location moves to its final destination
    /// (the upgraded install's original path, or a fresh unique path) and the
    /// resulting [`Installation`] is returned. Aborted: a fresh install is
    /// deleted, an upgraded one goes back where it came from, and `None` is
    /// returned. A parked installation is restored either way.
    ///
    /// The transaction is idle afterwards on every path. `cancel` should not
    /// be the token that aborted the install, or cleanup stops immediately.
    ///
    /// # Errors
    ///
    /// - `NoActiveTransaction` without a prior `prepare`
    /// - `RestoreFailed` if the parked installation could not be put back
    /// - `ExecutableNotFound` if the finished install has no editor binary
    /// - file operation errors from the final relocation
    pub async fn complete(
        &mut self,
        aborted: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Installation>, Error> {
        let mut state = self.state.take().ok_or(InstallError::NoActiveTransaction)?;
        state.phase = TransactionPhase::Completing;
        let canonical = self.layout.canonical.clone();

        let destination = match (&state.upgrade_original_path, aborted) {
            (Some(original), _) => Some(original.clone()),
            (None, false) => Some(resolve_unique_install_path(
                &state.version,
                state.templates.as_deref(),
                &self.layout.default_root,
            )),
            (None, true) => None,
        };

        let primary = match &destination {
            Some(dest) if dest == &canonical => Ok(()),
            Some(dest) => self.relocate_final(&state, &canonical, dest, cancel).await,
            None => self.file_ops.delete_path(&canonical, cancel).await,
        };

        let restored = if state.moved_existing {
            self.restore_parked(&state).await
        } else {
            Ok(())
        };

        self.emit_transaction(TransactionEvent::Completed {
            id: state.id,
            version: state.version.to_string(),
            aborted,
            destination: destination.as_ref().map(|d| d.display().to_string()),
        });

        match (primary, restored) {
            (Err(primary), Err(restore)) => {
                self.emit_error_with_details(
                    "install could not be moved into place",
                    primary.user_message(),
                );
                return Err(restore);
            }
            (Err(primary), Ok(())) => return Err(primary),
            (Ok(()), Err(restore)) => return Err(restore),
            (Ok(()), Ok(())) => {}
        }

        if aborted {
            return Ok(None);
        }
        let Some(root) = destination else {
            return Ok(None);
        };

        let executable = self.layout.executable_in(&root);
        if !exists(&executable).await {
            return Err(InstallError::ExecutableNotFound {
                path: executable.display().to_string(),
            }
            .into());
        }
        Ok(Some(Installation::new(state.version, root, executable)))
    }

    async fn relocate_final(
        &self,
        state: &TransactionState,
        canonical: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if exists(destination).await {
            return Err(InstallError::DestinationExists {
                path: destination.display().to_string(),
            }
            .into());
        }
        self.file_ops.move_path(canonical, destination, cancel).await?;
        self.emit_relocated(state, canonical, destination);
        Ok(())
    }

    /// Put the parked installation back at the canonical location.
    ///
    /// Never moves onto an occupied canonical location. Uses its own token:
    /// restoration runs even after the install was cancelled.
    async fn restore_parked(&self, state: &TransactionState) -> Result<(), Error> {
        let canonical = &self.layout.canonical;
        let fallback = &self.layout.fallback;
        let cancel = CancellationToken::new();

        let result = if exists(canonical).await {
            Err(format!("{} is still occupied", canonical.display()))
        } else {
            self.file_ops
                .move_path(fallback, canonical, &cancel)
                .await
                .map_err(|e| e.user_message().into_owned())
        };

        match result {
            Ok(()) => {
                self.emit_transaction(TransactionEvent::Restored {
                    id: state.id,
                    fallback: fallback.display().to_string(),
                    canonical: canonical.display().to_string(),
                });
                Ok(())
            }
            Err(message) => {
                let err = InstallError::RestoreFailed {
                    fallback: fallback.display().to_string(),
                    canonical: canonical.display().to_string(),
                    message,
                };
                tracing::error!(id = %state.id, error = %err, "parked installation was not restored");
                self.emit_transaction(TransactionEvent::RestoreFailed {
                    id: state.id,
                    fallback: fallback.display().to_string(),
                    canonical: canonical.display().to_string(),
                    failure: FailureContext::from_error(&err),
                });
                Err(err.into())
            }
        }
    }

    fn emit_relocated(&self, state: &TransactionState, from: &Path, to: &Path) {
        self.emit_transaction(TransactionEvent::Relocated {
            id: state.id,
            from: from.display().to_string(),
            to: to.display().to_string(),
        });
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}
