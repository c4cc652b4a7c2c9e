//! Small user-selectable settings shared by config and CLI

use serde::{Deserialize, Serialize};
use std::fmt;

/// How filesystem operations obtain elevated rights after a user-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMethod {
    /// `sudo` on Unix, `runas` on Windows
    #[default]
    Auto,
    Sudo,
    Runas,
    /// Never elevate; failures surface as insufficient privilege
    None,
}

impl ElevationMethod {
    /// Parse the value used in config files and environment variables
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "sudo" => Some(Self::Sudo),
            "runas" => Some(Self::Runas),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for ElevationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Sudo => write!(f, "sudo"),
            Self::Runas => write!(f, "runas"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}
