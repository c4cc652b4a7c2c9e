#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform adapters and high-level operations for unityup
//!
//! Each supported OS has one [`Platform`] implementation that owns its own
//! install transaction. The CLI talks to these through the trait and the
//! orchestration helpers in this crate.

mod adapter;
mod discovery;
mod linux;
mod macos;
mod orchestrate;
mod platform;
mod windows;

pub use adapter::OsDefaults;
pub use discovery::{read_info_plist, version_from_dir_name, DirectoryScanFinder, MacOSFinder};
pub use linux::{LinuxInstaller, LinuxPlatform};
pub use macos::{MacOSInstaller, MacOSPlatform};
pub use orchestrate::{ensure_log_file_flag, ensure_privileged, install_queue};
pub use platform::{Platform, RunMode, RunOutcome};
pub use windows::{WindowsInstaller, WindowsPlatform};

use std::sync::Arc;
use unityup_config::Config;
use unityup_events::EventSender;
use unityup_platform::TokioProcessRunner;

/// The platform implementation for the OS this binary was built for
#[must_use]
pub fn current(config: &Config, events: Option<EventSender>) -> Box<dyn Platform> {
    let mut runner = TokioProcessRunner::new();
    if let Some(tx) = &events {
        runner = runner.with_events(tx.clone());
    }
    let runner = Arc::new(runner);

    #[cfg(target_os = "macos")]
    {
        Box::new(MacOSPlatform::new(config, runner, events))
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsPlatform::new(config, runner, events))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Box::new(LinuxPlatform::new(config, runner, events))
    }
}
