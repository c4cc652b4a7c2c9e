//! Destination path resolution

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use unityup_config::fixed_paths::TEMPLATE_DELIMITER;
use unityup_types::{PackageItem, VersionMetadata};

/// Token in package destinations that expands to the install root
const UNITY_PATH_TOKEN: &str = "UNITY_PATH";

/// Substitute `{major}`, `{minor}`, `{patch}`, `{type}`, `{build}` and
/// `{hash}` (any case) with fields of `version`. Unknown tokens are kept.
#[must_use]
pub fn expand_template(template: &str, version: &VersionMetadata) -> String {
    substitute(template, |token| match token.to_ascii_lowercase().as_str() {
        "major" => Some(version.major.to_string()),
        "minor" => Some(version.minor.to_string()),
        "patch" => Some(version.patch.to_string()),
        "type" => Some(version.release_type.code().to_string()),
        "build" => Some(version.build.to_string()),
        "hash" => Some(version.hash.clone().unwrap_or_default()),
        _ => None,
    })
}

fn substitute(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match lookup(token) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Find a destination for `version` that does not exist yet.
///
/// `templates` is a `;`-separated list; the first expanded candidate that
/// does not exist wins. When all exist (or none are given) a `-N` suffix is
/// appended to the last candidate, or to `<default_root>/Unity <version>`,
/// counting up from 1 until a free path is found. The default candidate is
/// tried bare first.
#[must_use]
pub fn resolve_unique_install_path(
    version: &VersionMetadata,
    templates: Option<&str>,
    default_root: &Path,
) -> PathBuf {
    let mut last = None;

    for template in templates
        .unwrap_or_default()
        .split(TEMPLATE_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let candidate = PathBuf::from(expand_template(template, version));
        if !exists(&candidate) {
            return candidate;
        }
        last = Some(candidate);
    }

    let base = match last {
        Some(candidate) => candidate,
        None => {
            let candidate = default_root.join(format!("Unity {}", version.short()));
            if !exists(&candidate) {
                return candidate;
            }
            candidate
        }
    };

    (1u32..)
        .map(|n| with_suffix(&base, n))
        .find(|candidate| !exists(candidate))
        .unwrap_or(base)
}

/// Where a package's payload goes.
///
/// `{UNITY_PATH}` in the item's destination expands to `install_root`; a
/// relative result is taken relative to `install_root`. Items without a
/// destination use `install_root.join(default_subpath)`.
#[must_use]
pub fn resolve_package_destination(
    item: &PackageItem,
    install_root: &Path,
    default_subpath: &str,
) -> PathBuf {
    let Some(destination) = item.destination.as_deref() else {
        if default_subpath.is_empty() {
            return install_root.to_path_buf();
        }
        return install_root.join(default_subpath);
    };

    let root = install_root.to_string_lossy();
    let expanded = substitute(destination, |token| {
        token
            .eq_ignore_ascii_case(UNITY_PATH_TOKEN)
            .then(|| root.to_string())
    });
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        install_root.join(path)
    }
}

fn with_suffix(base: &Path, n: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("-{n}"));
    PathBuf::from(name)
}

fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use unityup_types::ReleaseType;

    fn version() -> VersionMetadata {
        VersionMetadata::new(2021, 3, 5, ReleaseType::Final, 1).with_hash("abcd")
    }

    #[test]
    fn expands_tokens_case_insensitively() {
        assert_eq!(
            expand_template(r"C:\Unity\{major}.{minor}.{patch}{type}{build}", &version()),
            r"C:\Unity\2021.3.5f1"
        );
        assert_eq!(
            expand_template("/opt/{MAJOR}-{Hash}-{unknown}", &version()),
            "/opt/2021-abcd-{unknown}"
        );
        assert_eq!(expand_template("/opt/{major", &version()), "/opt/{major");
    }

    #[test]
    fn missing_hash_expands_empty() {
        let version = VersionMetadata::new(2022, 1, 0, ReleaseType::Beta, 3);
        assert_eq!(expand_template("{hash}x", &version), "x");
    }

    #[test]
    fn unity_path_token_in_destination() {
        let item = PackageItem::new("Documentation", "/tmp/docs.zip")
            .with_destination("{UNITY_PATH}/Documentation");
        assert_eq!(
            resolve_package_destination(&item, Path::new("/Applications/Unity"), ""),
            PathBuf::from("/Applications/Unity/Documentation")
        );

        let relative = PackageItem::new("Android", "/tmp/a.zip").with_destination("PlaybackEngines");
        assert_eq!(
            resolve_package_destination(&relative, Path::new("/opt/Unity"), ""),
            PathBuf::from("/opt/Unity/PlaybackEngines")
        );

        let default = PackageItem::new("ja", "/tmp/ja.po");
        assert_eq!(
            resolve_package_destination(&default, Path::new("/opt/Unity"), "Editor/Data/Localization"),
            PathBuf::from("/opt/Unity/Editor/Data/Localization")
        );
    }
}
