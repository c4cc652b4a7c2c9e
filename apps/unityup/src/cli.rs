//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unityup_types::{ColorChoice, ElevationMethod, PackageItem, VersionMetadata};

/// unityup - transactional Unity editor installer
#[derive(Parser)]
#[command(name = "unityup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install, move and launch Unity editors")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the unityup log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How to obtain administrative rights when a file operation is denied
    #[arg(long, global = true, value_enum)]
    pub elevation: Option<ElevationMethod>,

    /// Destination templates separated by `;`, e.g. "/Applications/Unity {major}.{minor}.{patch}{type}{build}"
    #[arg(long, global = true, value_name = "TEMPLATES")]
    pub install_path: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install an editor and/or modules from downloaded artifacts
    #[command(alias = "i")]
    Install {
        /// Editor version, e.g. 2021.3.5f1
        version: VersionMetadata,

        /// Artifacts as NAME=PATH; the editor itself is named "Unity" and goes first
        #[arg(required = true, value_parser = parse_package)]
        packages: Vec<PackageItem>,
    },

    /// List installed editors
    #[command(alias = "ls")]
    List,

    /// Launch an installed editor
    Run {
        /// Editor version
        version: VersionMetadata,

        /// Start the editor and return immediately
        #[arg(long)]
        detach: bool,

        /// Arguments passed to the editor
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Move an installed editor to a new directory
    #[command(alias = "mv")]
    Move {
        /// Editor version
        version: VersionMetadata,

        /// New installation root; must not exist
        destination: PathBuf,
    },

    /// Delete an installed editor
    #[command(alias = "rm")]
    Uninstall {
        /// Editor version
        version: VersionMetadata,
    },

    /// Report whether this process can modify the install locations
    CheckPrivileges,
}

/// Parse `NAME=PATH` into a queue item
pub fn parse_package(arg: &str) -> Result<PackageItem, String> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{arg}'"))?;
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got '{arg}'"));
    }
    Ok(PackageItem::new(name, path))
}
