//! unityup - transactional Unity editor installer
//!
//! This is the CLI application. All installation work happens in the ops
//! crate; this binary wires configuration, logging, events and
//! cancellation around it.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{sort_installations, CommandResult, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use std::process;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use unityup_config::Config;
use unityup_errors::{Error, InstallError};
use unityup_events::EventReceiver;
use unityup_ops::{ensure_privileged, install_queue, Platform, RunMode, RunOutcome};
use unityup_platform::Elevation;
use unityup_types::{ColorChoice, InstallQueue, Installation, VersionMetadata};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(Some(code)) => process::exit(code),
        Ok(None) => {}
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic. Returns the exit code of a monitored editor.
async fn run(cli: Cli) -> Result<Option<i32>, CliError> {
    info!("Starting unityup v{}", env!("CARGO_PKG_VERSION"));

    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = unityup_events::channel();
    let platform = unityup_ops::current(&config, Some(event_sender));
    info!(platform = platform.name(), "platform selected");

    let colors_enabled = match cli.global.color.unwrap_or_default() {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.json);

    let result = execute_command_with_events(
        cli.command,
        platform,
        &config,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(match result {
        CommandResult::Run {
            outcome: RunOutcome::Exited { code },
        } => Some(code),
        _ => None,
    })
}

/// Execute command while draining events and watching for Ctrl-C
async fn execute_command_with_events(
    command: Commands,
    mut platform: Box<dyn Platform>,
    config: &Config,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandResult, CliError> {
    let cancel = CancellationToken::new();
    let mut command_future = Box::pin(execute_command(command, platform.as_mut(), config, &cancel));
    let mut interrupted = false;

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }

            signal = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                match signal {
                    Ok(()) => {
                        warn!("Interrupted, cancelling");
                        cancel.cancel();
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    platform: &mut dyn Platform,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Install { version, packages } => {
            let elevation = Elevation::new(config.elevation.method);
            ensure_privileged(&*platform, elevation, cancel).await?;

            let mut queue = InstallQueue::new(version);
            queue.items = packages;
            let installation =
                install_queue(platform, &queue, config.install_templates(), cancel).await?;
            Ok(CommandResult::Installed { installation })
        }

        Commands::List => {
            let mut installations = platform.find_installations(cancel).await?;
            sort_installations(&mut installations);
            Ok(CommandResult::List { installations })
        }

        Commands::Run {
            version,
            detach,
            args,
        } => {
            let installation = find_installation(&*platform, &version, cancel).await?;
            let mode = if detach {
                RunMode::Detached
            } else {
                RunMode::Monitored
            };
            let outcome = platform.run(&installation, &args, mode, cancel).await?;
            Ok(CommandResult::Run { outcome })
        }

        Commands::Move {
            version,
            destination,
        } => {
            let installation = find_installation(&*platform, &version, cancel).await?;
            let installation = platform
                .move_installation(&installation, &destination, cancel)
                .await?;
            Ok(CommandResult::Moved { installation })
        }

        Commands::Uninstall { version } => {
            let installation = find_installation(&*platform, &version, cancel).await?;
            platform.uninstall(&installation, cancel).await?;
            Ok(CommandResult::Uninstalled { installation })
        }

        Commands::CheckPrivileges => {
            let privileged = platform.is_privileged(cancel).await;
            Ok(CommandResult::Privileges {
                privileged,
                elevation: Elevation::new(config.elevation.method).method(),
            })
        }
    }
}

/// The installed editor matching `version`
async fn find_installation(
    platform: &dyn Platform,
    version: &VersionMetadata,
    cancel: &CancellationToken,
) -> Result<Installation, Error> {
    platform
        .find_installations(cancel)
        .await?
        .into_iter()
        .find(|installation| installation.version.matches(version))
        .ok_or_else(|| {
            InstallError::VersionNotInstalled {
                version: version.to_string(),
            }
            .into()
        })
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "unityup-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,unityup=debug"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: keep stdout and stderr free of log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: warnings and errors to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(method) = global.elevation {
        config.elevation.method = method;
    }
    if let Some(paths) = &global.install_path {
        config.install.paths = Some(paths.clone());
    }
}
