//! Finding installed editors

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use unityup_config::fixed_paths::{self, FALLBACK_SUFFIX};
use unityup_errors::{Error, VersionError};
use unityup_install::InstallationFinder;
use unityup_types::{Installation, VersionMetadata};

/// Pull an editor version out of a directory name such as
/// `2021.3.5f1`, `Unity 2021.3.5f1` or `Unity-2022.1.0b12`.
#[must_use]
pub fn version_from_dir_name(name: &str) -> Option<VersionMetadata> {
    if let Ok(version) = name.parse() {
        return Some(version);
    }
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|token| !token.is_empty())
        .find_map(|token| token.parse().ok())
}

/// Immediate subdirectories of `root`, skipping parked installations
async fn candidate_dirs(root: &Path) -> Vec<(PathBuf, String)> {
    let mut dirs = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(root).await else {
        tracing::debug!(root = %root.display(), "search root not readable");
        return dirs;
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(FALLBACK_SUFFIX) {
            continue;
        }
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            dirs.push((entry.path(), name));
        }
    }
    dirs.sort();
    dirs
}

/// Scans roots for directories holding the editor binary and reads the
/// version from the directory name. Used on Linux and Windows.
#[derive(Debug, Clone)]
pub struct DirectoryScanFinder {
    roots: Vec<PathBuf>,
    executable_subpath: PathBuf,
}

impl DirectoryScanFinder {
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, executable_subpath: impl Into<PathBuf>) -> Self {
        Self {
            roots,
            executable_subpath: executable_subpath.into(),
        }
    }
}

#[async_trait]
impl InstallationFinder for DirectoryScanFinder {
    async fn find_installations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Installation>, Error> {
        let mut found = Vec::new();
        for root in &self.roots {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for (dir, name) in candidate_dirs(root).await {
                let executable = dir.join(&self.executable_subpath);
                if tokio::fs::metadata(&executable).await.is_err() {
                    continue;
                }
                match version_from_dir_name(&name) {
                    Some(version) => found.push(Installation::new(version, dir, executable)),
                    None => tracing::debug!(dir = %dir.display(), "editor without a version in its name"),
                }
            }
        }
        Ok(found)
    }
}

/// Read `CFBundleVersion` and `UnityBuildNumber` from an editor's Info.plist
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or has no usable version.
pub async fn read_info_plist(path: &Path) -> Result<VersionMetadata, Error> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;

    let value = plist::from_bytes::<plist::Value>(&data).map_err(|e| VersionError::ParseError {
        message: format!("{}: {e}", path.display()),
    })?;

    let plist::Value::Dictionary(dict) = value else {
        return Err(VersionError::ParseError {
            message: format!("{} is not a dictionary", path.display()),
        }
        .into());
    };

    let bundle_version = dict
        .get("CFBundleVersion")
        .and_then(plist::Value::as_string)
        .ok_or_else(|| VersionError::ParseError {
            message: format!("{} has no CFBundleVersion", path.display()),
        })?;

    let version: VersionMetadata = bundle_version.parse()?;
    Ok(match dict.get("UnityBuildNumber").and_then(plist::Value::as_string) {
        Some(hash) => version.with_hash(hash),
        None => version,
    })
}

/// Scans roots for `*/Unity.app` bundles and reads their Info.plist
#[derive(Debug, Clone)]
pub struct MacOSFinder {
    roots: Vec<PathBuf>,
}

impl MacOSFinder {
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

#[async_trait]
impl InstallationFinder for MacOSFinder {
    async fn find_installations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Installation>, Error> {
        let mut found = Vec::new();
        for root in &self.roots {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for (dir, _) in candidate_dirs(root).await {
                let info = dir.join(fixed_paths::macos::INFO_PLIST_SUBPATH);
                if tokio::fs::metadata(&info).await.is_err() {
                    continue;
                }
                match read_info_plist(&info).await {
                    Ok(version) => {
                        let executable = dir.join(fixed_paths::macos::EXECUTABLE_SUBPATH);
                        found.push(Installation::new(version, dir, executable));
                    }
                    Err(e) => tracing::warn!(path = %info.display(), error = %e, "skipping unreadable editor bundle"),
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unityup_types::ReleaseType;

    #[test]
    fn parses_common_directory_names() {
        let expected = VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1);
        assert_eq!(version_from_dir_name("2021.3.5f1"), Some(expected.clone()));
        assert_eq!(version_from_dir_name("Unity 2021.3.5f1"), Some(expected.clone()));
        assert_eq!(version_from_dir_name("Unity-2021.3.5f1"), Some(expected));
        assert_eq!(
            version_from_dir_name("2022.1.0b12 (abcd)").and_then(|v| v.hash),
            Some("abcd".to_string())
        );
        assert!(version_from_dir_name("Unity").is_none());
        assert!(version_from_dir_name("Hub").is_none());
    }
}
