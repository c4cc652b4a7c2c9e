//! Centralized, non-configurable filesystem locations for unityup
//!
//! Each supported OS gets its own module so every platform implementation can
//! be compiled and tested on any host. `current` aliases the one for the
//! running OS.

/// Marker appended to the canonical location's name while an existing
/// installation is parked out of the way.
pub const FALLBACK_SUFFIX: &str = " (Moved by unityup)";

/// Separator between templates in the install path list
pub const TEMPLATE_DELIMITER: char = ';';

/// Reserved flag that stops the editor from writing its own log file
pub const LOG_FILE_FLAG: &str = "-logFile";

pub mod macos {
    pub const CANONICAL_PATH: &str = "/Applications/Unity";
    pub const INSTALL_ROOT: &str = "/Applications";
    pub const EXECUTABLE_SUBPATH: &str = "Unity.app/Contents/MacOS/Unity";
    pub const INFO_PLIST_SUBPATH: &str = "Unity.app/Contents/Info.plist";
    pub const LOCALIZATION_SUBPATH: &str = "Unity.app/Contents/Localization";
}

pub mod windows {
    pub const CANONICAL_PATH: &str = r"C:\Program Files\Unity";
    pub const INSTALL_ROOT: &str = r"C:\Program Files";
    pub const EXECUTABLE_SUBPATH: &str = r"Editor\Unity.exe";
    pub const LOCALIZATION_SUBPATH: &str = r"Editor\Data\Localization";
}

pub mod linux {
    pub const CANONICAL_PATH: &str = "/opt/Unity";
    pub const INSTALL_ROOT: &str = "/opt";
    pub const EXECUTABLE_SUBPATH: &str = "Editor/Unity";
    pub const LOCALIZATION_SUBPATH: &str = "Editor/Data/Localization";
}

#[cfg(target_os = "macos")]
pub use macos as current;

#[cfg(target_os = "windows")]
pub use windows as current;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use linux as current;
