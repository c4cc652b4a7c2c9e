//! Elevated command construction
//!
//! Unix hosts elevate through `sudo`. Windows hosts use PowerShell's
//! `Start-Process -Verb RunAs`, which raises a UAC prompt and reports the
//! elevated child's exit code back to the caller.

use std::path::Path;
use unityup_errors::PlatformError;
use unityup_types::ElevationMethod;

use crate::process::PlatformCommand;

/// A filesystem operation that can be retried with elevated rights
#[derive(Debug, Clone, Copy)]
pub enum FileOp<'a> {
    Move {
        source: &'a Path,
        destination: &'a Path,
    },
    Copy {
        source: &'a Path,
        destination: &'a Path,
    },
    /// Copy what is inside the `source` directory into `destination`,
    /// creating it if needed and merging with anything already there
    CopyContents {
        source: &'a Path,
        destination: &'a Path,
    },
    Delete {
        path: &'a Path,
    },
    CreateDir {
        path: &'a Path,
    },
}

impl FileOp<'_> {
    /// Short operation name used in errors and events
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Copy { .. } | Self::CopyContents { .. } => "copy",
            Self::Delete { .. } => "delete",
            Self::CreateDir { .. } => "create_dir",
        }
    }

    /// The path the operation targets
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Move { destination, .. }
            | Self::Copy { destination, .. }
            | Self::CopyContents { destination, .. } => destination,
            Self::Delete { path } | Self::CreateDir { path } => path,
        }
    }

    fn posix_command(&self) -> PlatformCommand {
        match self {
            Self::Move {
                source,
                destination,
            } => PlatformCommand::new("mv")
                .arg("-f")
                .arg(source.to_string_lossy())
                .arg(destination.to_string_lossy()),
            Self::Copy {
                source,
                destination,
            } => PlatformCommand::new("cp")
                .arg("-R")
                .arg(source.to_string_lossy())
                .arg(destination.to_string_lossy()),
            Self::CopyContents {
                source,
                destination,
            } => PlatformCommand::new("cp")
                .arg("-R")
                .arg(source.join(".").to_string_lossy())
                .arg(destination.to_string_lossy()),
            Self::Delete { path } => PlatformCommand::new("rm")
                .arg("-rf")
                .arg(path.to_string_lossy()),
            Self::CreateDir { path } => PlatformCommand::new("mkdir")
                .arg("-p")
                .arg(path.to_string_lossy()),
        }
    }

    fn powershell_script(&self) -> String {
        match self {
            Self::Move {
                source,
                destination,
            } => format!(
                "Move-Item -LiteralPath {} -Destination {} -Force",
                ps_quote(&source.to_string_lossy()),
                ps_quote(&destination.to_string_lossy())
            ),
            Self::Copy {
                source,
                destination,
            } => format!(
                "Copy-Item -LiteralPath {} -Destination {} -Recurse -Force",
                ps_quote(&source.to_string_lossy()),
                ps_quote(&destination.to_string_lossy())
            ),
            Self::CopyContents {
                source,
                destination,
            } => {
                let destination = ps_quote(&destination.to_string_lossy());
                format!(
                    "New-Item -ItemType Directory -Force -Path {destination} | Out-Null; \
                     Get-ChildItem -LiteralPath {} -Force | Copy-Item -Destination {destination} -Recurse -Force",
                    ps_quote(&source.to_string_lossy())
                )
            }
            Self::Delete { path } => format!(
                "Remove-Item -LiteralPath {} -Recurse -Force",
                ps_quote(&path.to_string_lossy())
            ),
            Self::CreateDir { path } => format!(
                "New-Item -ItemType Directory -Force -Path {} | Out-Null",
                ps_quote(&path.to_string_lossy())
            ),
        }
    }
}

/// Builds elevated variants of commands according to the configured method
#[derive(Debug, Clone, Copy, Default)]
pub struct Elevation {
    method: ElevationMethod,
}

impl Elevation {
    #[must_use]
    pub fn new(method: ElevationMethod) -> Self {
        Self { method }
    }

    /// Configured method, with `Auto` resolved for the running OS
    #[must_use]
    pub fn method(&self) -> ElevationMethod {
        match self.method {
            ElevationMethod::Auto if cfg!(windows) => ElevationMethod::Runas,
            ElevationMethod::Auto => ElevationMethod::Sudo,
            other => other,
        }
    }

    /// Whether elevated retries are possible at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.method() != ElevationMethod::None
    }

    /// Elevated command performing `op`
    ///
    /// # Errors
    ///
    /// Returns `InsufficientPrivilege` when elevation is disabled.
    pub fn command_for(&self, op: &FileOp<'_>) -> Result<PlatformCommand, PlatformError> {
        match self.method() {
            ElevationMethod::Runas => {
                let inner = PlatformCommand::new("powershell")
                    .args(["-NoProfile", "-NonInteractive", "-Command"])
                    .arg(op.powershell_script());
                self.wrap(op.name(), inner)
            }
            _ => self.wrap(op.name(), op.posix_command()),
        }
    }

    /// Wrap an arbitrary command so it runs elevated
    ///
    /// # Errors
    ///
    /// Returns `InsufficientPrivilege` when elevation is disabled.
    pub fn wrap(
        &self,
        operation: &str,
        inner: PlatformCommand,
    ) -> Result<PlatformCommand, PlatformError> {
        match self.method() {
            ElevationMethod::None => Err(PlatformError::InsufficientPrivilege {
                operation: operation.to_string(),
                message: "elevation is disabled in configuration".to_string(),
            }),
            ElevationMethod::Runas => Ok(runas(&inner)),
            ElevationMethod::Sudo | ElevationMethod::Auto => {
                let mut cmd = PlatformCommand::new("sudo")
                    .arg(inner.program())
                    .args(inner.get_args());
                if let Some(dir) = inner.get_current_dir() {
                    cmd = cmd.current_dir(dir.clone());
                }
                Ok(cmd)
            }
        }
    }
}

fn runas(inner: &PlatformCommand) -> PlatformCommand {
    let arg_list = inner
        .get_args()
        .iter()
        .map(|arg| {
            // Start-Process joins the list with spaces without quoting
            if arg.contains(char::is_whitespace) {
                ps_quote(&format!("\"{arg}\""))
            } else {
                ps_quote(arg)
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    let mut script = format!(
        "$p = Start-Process -FilePath {} -Verb RunAs -Wait -PassThru -WindowStyle Hidden",
        ps_quote(inner.program())
    );
    if !arg_list.is_empty() {
        script.push_str(&format!(" -ArgumentList @({arg_list})"));
    }
    if let Some(dir) = inner.get_current_dir() {
        script.push_str(&format!(
            " -WorkingDirectory {}",
            ps_quote(&dir.to_string_lossy())
        ));
    }
    script.push_str("; exit $p.ExitCode");

    PlatformCommand::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command"])
        .arg(script)
}

/// Single-quote a string for PowerShell
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
