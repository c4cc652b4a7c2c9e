//! Transaction state and install layout

use std::path::{Path, PathBuf};
use unityup_types::VersionMetadata;
use uuid::Uuid;

/// Where things live for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Location installers write into
    pub canonical: PathBuf,
    /// Parking spot for an installation found at `canonical`
    pub fallback: PathBuf,
    /// Root for fresh installs when no template yields a free path
    pub default_root: PathBuf,
    /// Path of the editor binary relative to an install root
    pub executable_subpath: PathBuf,
}

impl InstallLayout {
    /// Layout with the fallback derived from the canonical location
    pub fn new(
        canonical: impl Into<PathBuf>,
        default_root: impl Into<PathBuf>,
        executable_subpath: impl Into<PathBuf>,
    ) -> Self {
        let canonical = canonical.into();
        Self {
            fallback: unityup_config::fallback_path(&canonical),
            canonical,
            default_root: default_root.into(),
            executable_subpath: executable_subpath.into(),
        }
    }

    /// Editor binary inside `root`
    #[must_use]
    pub fn executable_in(&self, root: &Path) -> PathBuf {
        root.join(&self.executable_subpath)
    }
}

/// Phase of the active transaction. No state at all means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    Preparing,
    Installing,
    Completing,
}

/// Everything one running install needs to remember
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub id: Uuid,
    pub version: VersionMetadata,
    pub templates: Option<String>,
    /// Set only when adding modules to an existing installation
    pub upgrade_original_path: Option<PathBuf>,
    /// An installation was parked at the fallback location by `prepare`
    pub moved_existing: bool,
    pub main_installed: bool,
    pub phase: TransactionPhase,
}

impl TransactionState {
    #[must_use]
    pub fn new(version: VersionMetadata, templates: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            templates,
            upgrade_original_path: None,
            moved_existing: false,
            main_installed: false,
            phase: TransactionPhase::Preparing,
        }
    }

    #[must_use]
    pub fn is_upgrade(&self) -> bool {
        self.upgrade_original_path.is_some()
    }

    /// Whether a non-editor package may be installed now
    #[must_use]
    pub fn accepts_modules(&self) -> bool {
        self.main_installed || self.is_upgrade()
    }
}
