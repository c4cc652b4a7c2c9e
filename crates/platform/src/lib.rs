//! Platform layer for unityup.
//!
//! This crate provides the pieces the install transaction needs from the host:
//! - Process execution behind the [`ProcessRunner`] seam, with event emission
//! - Monitored and detached launches of the installed editor
//! - Elevation wrappers (`sudo`, PowerShell `RunAs`) for commands and file operations
//! - [`PrivilegedFileOps`]: move/copy/delete that retry once elevated on failure
//! - A privilege check for the current process

pub mod elevation;
pub mod filesystem;
pub mod privilege;
pub mod process;

pub use elevation::{Elevation, FileOp};
pub use filesystem::PrivilegedFileOps;
pub use privilege::{effective_uid_is_root, is_privileged, net_session_succeeds};
pub use process::{
    run_monitored, spawn_detached, CommandOutput, PlatformCommand, ProcessRunner,
    TokioProcessRunner,
};

/// Cancellation token threaded through every awaited operation
pub use tokio_util::sync::CancellationToken;
