use serde::{Deserialize, Serialize};

/// Output of an editor launched in monitored mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ProcessEvent {
    Spawned { executable: String, pid: Option<u32> },

    /// One line written to the child's stdout
    Output { line: String },

    /// One line written to the child's stderr
    ErrorOutput { line: String },

    Exited { code: i32 },

    /// The child was started detached and is no longer tracked
    Detached { executable: String, pid: Option<u32> },
}
