//! Editor version metadata
//!
//! Versions look like `2021.3.5f1`: year-based major, minor, patch, a single
//! character release type and a build number. The changeset hash is optional
//! and is written in parentheses after the version (`2021.3.5f1 (abcd1234)`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unityup_errors::VersionError;

/// Release channel of an editor build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Experimental,
    Alpha,
    Beta,
    Final,
    Patch,
}

impl ReleaseType {
    /// Single-character code used in version strings and path templates
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Experimental => 'x',
            Self::Alpha => 'a',
            Self::Beta => 'b',
            Self::Final => 'f',
            Self::Patch => 'p',
        }
    }

    /// Look up a release type by its code (case-insensitive)
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'x' => Some(Self::Experimental),
            'a' => Some(Self::Alpha),
            'b' => Some(Self::Beta),
            'f' => Some(Self::Final),
            'p' => Some(Self::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Immutable description of one editor version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub release_type: ReleaseType,
    pub build: u32,
    /// Changeset hash, opaque to the installer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl VersionMetadata {
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32, release_type: ReleaseType, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            release_type,
            build,
            hash: None,
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.hash = if hash.is_empty() { None } else { Some(hash) };
        self
    }

    /// Whether `other` names the same build.
    ///
    /// Hashes only take part when both sides know theirs; discovered
    /// installations often lack one.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        let same_build = self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.release_type == other.release_type
            && self.build == other.build;
        match (&self.hash, &other.hash) {
            (Some(a), Some(b)) => same_build && a.eq_ignore_ascii_case(b),
            _ => same_build,
        }
    }

    /// Version string without the hash, e.g. `2021.3.5f1`
    #[must_use]
    pub fn short(&self) -> String {
        format!(
            "{}.{}.{}{}{}",
            self.major, self.minor, self.patch, self.release_type, self.build
        )
    }
}

impl fmt::Display for VersionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hash {
            Some(hash) => write!(f, "{} ({hash})", self.short()),
            None => f.write_str(&self.short()),
        }
    }
}

impl FromStr for VersionMetadata {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let invalid = || VersionError::InvalidVersion {
            input: input.to_string(),
        };

        let (version_part, hash) = match trimmed.split_once('(') {
            Some((version, rest)) => {
                let hash = rest.strip_suffix(')').ok_or_else(invalid)?.trim();
                (version.trim(), Some(hash.to_string()))
            }
            None => (trimmed, None),
        };

        let mut parts = version_part.splitn(3, '.');
        let major = parse_number(parts.next(), input)?;
        let minor = parse_number(parts.next(), input)?;
        let tail = parts.next().ok_or_else(invalid)?;

        let type_pos = tail
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let patch = parse_number(Some(&tail[..type_pos]), input)?;

        let mut rest = tail[type_pos..].chars();
        let code = rest.next().ok_or_else(invalid)?;
        let release_type =
            ReleaseType::from_code(code).ok_or_else(|| VersionError::UnknownReleaseType {
                input: input.to_string(),
                code,
            })?;
        let build = parse_number(Some(rest.as_str()), input)?;

        let version = Self::new(major, minor, patch, release_type, build);
        Ok(match hash {
            Some(hash) => version.with_hash(hash),
            None => version,
        })
    }
}

fn parse_number(part: Option<&str>, input: &str) -> Result<u32, VersionError> {
    let part = part.ok_or_else(|| VersionError::InvalidVersion {
        input: input.to_string(),
    })?;
    if part.is_empty() {
        return Err(VersionError::InvalidVersion {
            input: input.to_string(),
        });
    }
    part.parse().map_err(|_| VersionError::ParseError {
        message: format!("'{part}' is not a number in {input}"),
    })
}
