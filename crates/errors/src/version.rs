//! Editor version parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    InvalidVersion { input: String },

    #[error("unknown release type '{code}' in {input}")]
    UnknownReleaseType { input: String, code: char },

    #[error("version parse error: {message}")]
    ParseError { message: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } | Self::ParseError { .. } => {
                Some("Use full editor versions like 2021.3.5f1, optionally followed by the changeset hash in parentheses.")
            }
            Self::UnknownReleaseType { .. } => {
                Some("Release types are a (alpha), b (beta), f (final), p (patch) or x (experimental).")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidVersion { .. } => "version.invalid_version",
            Self::UnknownReleaseType { .. } => "version.unknown_release_type",
            Self::ParseError { .. } => "version.parse_error",
        };
        Some(code)
    }
}
