use serde::{Deserialize, Serialize};

use unityup_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod platform;
pub mod process;
pub mod transaction;

pub use general::GeneralEvent;
pub use platform::PlatformEvent;
pub use process::ProcessEvent;
pub use transaction::TransactionEvent;

/// Top-level application event, grouped by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Install transaction lifecycle
    Transaction(TransactionEvent),

    /// Commands run by the installer, including elevated retries
    Platform(PlatformEvent),

    /// Output of a monitored editor process
    Process(ProcessEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Transaction(TransactionEvent::RestoreFailed { .. })
            | Self::Platform(
                PlatformEvent::ElevationFailed { .. } | PlatformEvent::ProcessExecutionFailed { .. },
            )
            | Self::Process(ProcessEvent::ErrorOutput { .. }) => Level::ERROR,

            Self::Platform(PlatformEvent::ElevationRetry { .. }) => Level::WARN,

            Self::Platform(
                PlatformEvent::ProcessExecutionStarted { .. }
                | PlatformEvent::ProcessExecutionCompleted { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (used for filtering)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "unityup::events::general",
            Self::Transaction(_) => "unityup::events::transaction",
            Self::Platform(_) => "unityup::events::platform",
            Self::Process(_) => "unityup::events::process",
        }
    }
}
