//! Process execution and elevation events

use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Platform operation events for commands run on behalf of the installer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// External command started
    ProcessExecutionStarted {
        /// Program being executed
        command: String,
        /// Arguments passed to the program
        args: Vec<String>,
        /// Whether the command runs through the elevation wrapper
        elevated: bool,
    },

    /// External command finished (any exit code)
    ProcessExecutionCompleted {
        command: String,
        exit_code: i32,
        duration_ms: u64,
    },

    /// External command could not be spawned or awaited
    ProcessExecutionFailed { command: String, error: String },

    /// A user-level filesystem operation failed and is being retried elevated
    ElevationRetry {
        /// Operation name (`move`, `copy`, `delete`, `create_dir`)
        operation: String,
        /// Path the operation was applied to
        path: String,
        /// Why the user-level attempt failed
        reason: String,
    },

    /// The elevated retry itself failed
    ElevationFailed {
        operation: String,
        path: String,
        failure: FailureContext,
    },
}
