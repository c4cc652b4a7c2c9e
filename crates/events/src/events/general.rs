use serde::{Deserialize, Serialize};

/// Operation lifecycle and free-form error reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Error that does not abort the current call, with the paths or
    /// command output involved
    Error {
        message: String,
        details: Option<String>,
    },

    /// A move or uninstall of a finished installation began
    OperationStarted { operation: String },

    /// The operation finished
    OperationCompleted { operation: String, success: bool },

    /// The operation failed with `error`
    OperationFailed { operation: String, error: String },
}

impl GeneralEvent {
    pub fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: Some(details.into()),
        }
    }
}
