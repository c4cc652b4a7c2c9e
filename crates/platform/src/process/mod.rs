//! Process execution operations

mod monitor;
mod runner;

pub use monitor::{run_monitored, spawn_detached};
pub use runner::TokioProcessRunner;

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use unityup_errors::{Error, PlatformError};

/// Platform-specific command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Add an argument to the command
    #[must_use]
    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_string()));
        self
    }

    /// Set the working directory for the command
    #[must_use]
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Mutable access to the arguments
    pub fn args_mut(&mut self) -> &mut Vec<String> {
        &mut self.args
    }

    /// Get the current directory
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    pub(crate) fn to_tokio(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a command line and reports exit code plus captured output.
///
/// A non-zero exit code is not an error at this level; callers decide.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `cmd` to completion.
    ///
    /// Returns `Error::Cancelled` as soon as `cancel` fires. The child is not
    /// killed; it keeps running detached from the caller.
    async fn run(&self, cmd: PlatformCommand, cancel: &CancellationToken)
        -> Result<CommandOutput, Error>;

    /// Run `cmd` and turn a non-zero exit code into `PlatformError::CommandFailed`
    async fn run_checked(
        &self,
        cmd: PlatformCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, Error> {
        let display = cmd.to_string();
        let output = self.run(cmd, cancel).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(PlatformError::CommandFailed {
                command: display,
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            }
            .into())
        }
    }
}
