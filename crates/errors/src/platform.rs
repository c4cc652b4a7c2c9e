//! Platform-specific operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlatformError {
    #[error("elevated {operation} failed ({command} exited with {exit_code}): {stderr}")]
    ElevationFailure {
        operation: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("insufficient privileges for {operation}: {message}")]
    InsufficientPrivilege { operation: String, message: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command {command} exited with {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ElevationFailure { .. } => {
                Some("The elevated retry was refused or failed; check the password prompt and the command output above.")
            }
            Self::InsufficientPrivilege { .. } => Some(
                "Re-run with administrator rights, or set [elevation] method to sudo/runas in the config.",
            ),
            Self::CommandFailed { .. } | Self::ProcessExecutionFailed { .. } => {
                Some("Inspect the command output for details.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ElevationFailure { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ElevationFailure { .. } => "platform.elevation_failure",
            Self::InsufficientPrivilege { .. } => "platform.insufficient_privilege",
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::CommandFailed { .. } => "platform.command_failed",
        };
        Some(code)
    }
}
