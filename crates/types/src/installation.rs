//! Completed, addressable installations

use crate::version::VersionMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An editor installed on this machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub version: VersionMetadata,
    /// Absolute path to the runnable editor binary
    pub executable: PathBuf,
    /// Absolute path to the installation root
    pub root: PathBuf,
}

impl Installation {
    #[must_use]
    pub fn new(version: VersionMetadata, root: PathBuf, executable: PathBuf) -> Self {
        Self {
            version,
            executable,
            root,
        }
    }
}
