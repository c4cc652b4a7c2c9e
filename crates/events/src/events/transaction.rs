//! Install transaction lifecycle events

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FailureContext;

/// Events emitted as an install transaction moves through its phases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TransactionEvent {
    /// `prepare` finished; packages may now be installed
    Prepared {
        id: Uuid,
        version: String,
        /// True when only modules are added to an existing installation
        upgrade: bool,
    },

    /// An installation was moved out of (or into) the canonical location
    Relocated {
        id: Uuid,
        from: String,
        to: String,
    },

    PackageStarted {
        id: Uuid,
        package: String,
        file_type: String,
    },

    PackageCompleted { id: Uuid, package: String },

    /// The transaction reached `complete`
    Completed {
        id: Uuid,
        version: String,
        aborted: bool,
        destination: Option<String>,
    },

    /// A parked installation was moved back to the canonical location
    Restored {
        id: Uuid,
        fallback: String,
        canonical: String,
    },

    /// Restoring a parked installation failed; manual recovery is needed
    RestoreFailed {
        id: Uuid,
        fallback: String,
        canonical: String,
        failure: FailureContext,
    },
}
