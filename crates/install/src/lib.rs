#![warn(clippy::pedantic)]
#![deny(clippy::all)]

//! Install transaction for unityup
//!
//! This crate owns the part of an install that must leave the machine
//! consistent whatever happens: parking an existing installation, staging the
//! new one at the canonical location, and moving everything to its final
//! place (or discarding it) on completion.

mod path;
mod traits;
mod transaction;

pub use path::{expand_template, resolve_package_destination, resolve_unique_install_path};
pub use traits::{InstallationFinder, PackageInstaller};
pub use transaction::{InstallLayout, InstallTransaction, TransactionPhase, TransactionState};

// Re-export EventSender for callers wiring up transactions
pub use unityup_events::EventSender;
