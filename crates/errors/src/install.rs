//! Install transaction error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("already installing {version}; complete the running transaction first")]
    AlreadyInstalling { version: String },

    #[error("no install transaction is active")]
    NoActiveTransaction,

    #[error("cannot move existing installation at {canonical}: fallback location {fallback} is already occupied")]
    FallbackPathOccupied { canonical: String, fallback: String },

    #[error("version {version} is not installed")]
    VersionNotInstalled { version: String },

    #[error("package {package} requires the editor to be installed first")]
    EditorNotInstalledFirst { package: String },

    #[error("unsupported package type '{file_type}' for package {package}")]
    UnsupportedPackageType { package: String, file_type: String },

    #[error("destination already exists: {path}")]
    DestinationExists { path: String },

    #[error("editor executable not found at {path}")]
    ExecutableNotFound { path: String },

    #[error("failed to restore {fallback} to {canonical}: {message}")]
    RestoreFailed {
        fallback: String,
        canonical: String,
        message: String,
    },

    #[error("installer for {package} failed: {message}")]
    InstallerFailed { package: String, message: String },

    #[error("invalid install queue: {message}")]
    InvalidQueue { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyInstalling { .. } => {
                Some("Wait for the running installation to finish before starting another one.")
            }
            Self::FallbackPathOccupied { .. } => Some(
                "A previous run left a displaced installation behind. Move or delete it manually and retry.",
            ),
            Self::VersionNotInstalled { .. } => {
                Some("Install the editor together with the modules, or run `unityup list` to see installed versions.")
            }
            Self::EditorNotInstalledFirst { .. } | Self::InvalidQueue { .. } => {
                Some("Queue the editor package before any of its modules.")
            }
            Self::DestinationExists { .. } => {
                Some("Pick a destination that does not exist yet, or remove the existing one.")
            }
            Self::RestoreFailed { .. } => Some(
                "The displaced installation was not moved back. Rename the fallback directory to the canonical location manually.",
            ),
            Self::ExecutableNotFound { .. } => {
                Some("The installer finished but the editor binary is missing; the package may be corrupt.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::InstallerFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AlreadyInstalling { .. } => "install.already_installing",
            Self::NoActiveTransaction => "install.no_active_transaction",
            Self::FallbackPathOccupied { .. } => "install.fallback_path_occupied",
            Self::VersionNotInstalled { .. } => "install.version_not_installed",
            Self::EditorNotInstalledFirst { .. } => "install.editor_not_installed_first",
            Self::UnsupportedPackageType { .. } => "install.unsupported_package_type",
            Self::DestinationExists { .. } => "install.destination_exists",
            Self::ExecutableNotFound { .. } => "install.executable_not_found",
            Self::RestoreFailed { .. } => "install.restore_failed",
            Self::InstallerFailed { .. } => "install.installer_failed",
            Self::InvalidQueue { .. } => "install.invalid_queue",
        };
        Some(code)
    }
}
