#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for unityup
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/unityup/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;

pub use constants as fixed_paths;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use unityup_errors::{ConfigError, Error};
use unityup_types::ElevationMethod;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub elevation: ElevationConfig,

    #[serde(default)]
    pub process: ProcessConfig,
}

/// Where editors are installed and discovered
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstallConfig {
    /// `;`-separated list of destination templates, e.g.
    /// `/Applications/Unity {major}.{minor}.{patch}{type}{build}`
    pub paths: Option<String>,
    /// Override for the canonical install location
    pub canonical_path: Option<PathBuf>,
    /// Extra directories scanned when listing installations
    #[serde(default)]
    pub search_roots: Vec<PathBuf>,
}

/// Privilege elevation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElevationConfig {
    #[serde(default)]
    pub method: ElevationMethod,
}

/// Child process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(default = "default_log_output")]
    pub log_output: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            log_output: default_log_output(),
        }
    }
}

fn default_log_output() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("unityup").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
        }

        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // UNITYUP_INSTALL_PATH
        if let Ok(paths) = std::env::var("UNITYUP_INSTALL_PATH") {
            self.install.paths = Some(paths);
        }

        // UNITYUP_CANONICAL_PATH
        if let Ok(canonical) = std::env::var("UNITYUP_CANONICAL_PATH") {
            if canonical.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "UNITYUP_CANONICAL_PATH".to_string(),
                    value: canonical,
                }
                .into());
            }
            self.install.canonical_path = Some(PathBuf::from(canonical));
        }

        // UNITYUP_ELEVATION
        if let Ok(method) = std::env::var("UNITYUP_ELEVATION") {
            self.elevation.method =
                ElevationMethod::parse(&method).ok_or_else(|| ConfigError::InvalidValue {
                    field: "UNITYUP_ELEVATION".to_string(),
                    value: method,
                })?;
        }

        Ok(())
    }

    /// Install path templates, if any are configured
    #[must_use]
    pub fn install_templates(&self) -> Option<&str> {
        self.install
            .paths
            .as_deref()
            .filter(|paths| !paths.trim().is_empty())
    }

    /// Canonical install location, honouring the configured override
    #[must_use]
    pub fn canonical_path_or(&self, platform_default: &str) -> PathBuf {
        self.install
            .canonical_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(platform_default))
    }

    /// Directory for debug log files
    #[must_use]
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("unityup")
            .join("logs")
    }
}

/// Location an existing installation is parked at while the canonical
/// location is in use: the canonical path with [`constants::FALLBACK_SUFFIX`]
/// appended to its final component.
#[must_use]
pub fn fallback_path(canonical: &Path) -> PathBuf {
    let mut name = canonical
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(constants::FALLBACK_SUFFIX);
    canonical.with_file_name(name)
}
