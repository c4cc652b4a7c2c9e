//! Packages queued for installation

use crate::version::VersionMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reserved package name of the editor itself
pub const EDITOR_PACKAGE: &str = "Unity";

/// Artifact kind, derived from the downloaded file's extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageFileType {
    Pkg,
    Dmg,
    Zip,
    Po,
    Exe,
    Msi,
    TarXz,
    TarGz,
    Unknown(String),
}

impl PackageFileType {
    /// Classify an artifact by its file name
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            return Self::TarXz;
        }
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Self::TarGz;
        }

        match name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("pkg") => Self::Pkg,
            Some("dmg") => Self::Dmg,
            Some("zip") => Self::Zip,
            Some("po") => Self::Po,
            Some("exe") => Self::Exe,
            Some("msi") => Self::Msi,
            Some(ext) => Self::Unknown(ext.to_string()),
            None => Self::Unknown(String::new()),
        }
    }
}

impl fmt::Display for PackageFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pkg => write!(f, "pkg"),
            Self::Dmg => write!(f, "dmg"),
            Self::Zip => write!(f, "zip"),
            Self::Po => write!(f, "po"),
            Self::Exe => write!(f, "exe"),
            Self::Msi => write!(f, "msi"),
            Self::TarXz => write!(f, "tar.xz"),
            Self::TarGz => write!(f, "tar.gz"),
            Self::Unknown(ext) if ext.is_empty() => write!(f, "unknown"),
            Self::Unknown(ext) => write!(f, "{ext}"),
        }
    }
}

/// One downloaded artifact waiting to be installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageItem {
    pub name: String,
    pub path: PathBuf,
    pub file_type: PackageFileType,
    /// Install destination template; `{UNITY_PATH}` expands to the install root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl PackageItem {
    /// Create an item, classifying the artifact from its extension
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_type = PackageFileType::from_path(&path);
        Self {
            name: name.into(),
            path,
            file_type,
            destination: None,
        }
    }

    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Whether this is the editor package every module depends on
    #[must_use]
    pub fn is_editor(&self) -> bool {
        self.name == EDITOR_PACKAGE
    }
}

/// Ordered set of packages to install for one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallQueue {
    pub version: VersionMetadata,
    pub items: Vec<PackageItem>,
}

impl InstallQueue {
    #[must_use]
    pub fn new(version: VersionMetadata) -> Self {
        Self {
            version,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: PackageItem) -> Self {
        self.items.push(item);
        self
    }

    /// Whether the queue installs the editor itself (fresh install) or only
    /// adds modules to an existing installation (upgrade)
    #[must_use]
    pub fn includes_editor(&self) -> bool {
        self.items.iter().any(PackageItem::is_editor)
    }

    /// Check that the editor, when queued, comes before every module
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the editor is queued after a
    /// module or more than once.
    pub fn validate(&self) -> Result<(), String> {
        let editor_positions: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_editor())
            .map(|(i, _)| i)
            .collect();

        match editor_positions.as_slice() {
            [] | [0] => Ok(()),
            [pos] => Err(format!(
                "{EDITOR_PACKAGE} must be installed first but is queued at position {}",
                pos + 1
            )),
            _ => Err(format!("{EDITOR_PACKAGE} is queued more than once")),
        }
    }
}
