#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the unityup installer
//!
//! This crate provides the data model shared by every other crate: the
//! editor version being installed, the packages queued for installation and
//! the installations that exist on disk.

pub mod installation;
pub mod package;
pub mod settings;
pub mod version;

// Re-export commonly used types
pub use installation::Installation;
pub use package::{InstallQueue, PackageFileType, PackageItem, EDITOR_PACKAGE};
pub use settings::{ColorChoice, ElevationMethod};
pub use version::{ReleaseType, VersionMetadata};
