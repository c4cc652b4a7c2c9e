//! Event handling and user feedback

use console::Style;
use unityup_events::{AppEvent, PlatformEvent, ProcessEvent, TransactionEvent};

use crate::logging::log_event_with_tracing;

/// Turns the event stream into log records and terminal status lines.
///
/// Warnings and errors reach the terminal through the tracing subscriber;
/// this handler only prints progress and the monitored editor's output.
pub struct EventHandler {
    colors_enabled: bool,
    /// Keep stdout clean for JSON output
    json_mode: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, json_mode: bool) -> Self {
        Self {
            colors_enabled,
            json_mode,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        if self.json_mode {
            // Editor output still matters; stderr keeps stdout parseable
            if let AppEvent::Process(
                ProcessEvent::Output { line } | ProcessEvent::ErrorOutput { line },
            ) = &event
            {
                eprintln!("{line}");
            }
            return;
        }

        match &event {
            AppEvent::Transaction(transaction) => self.handle_transaction(transaction),
            AppEvent::Platform(PlatformEvent::ElevationRetry { operation, path, .. }) => {
                self.show_status(&format!("Requesting elevated rights to {operation} {path}"));
            }
            AppEvent::Process(ProcessEvent::Output { line }) => println!("{line}"),
            AppEvent::Process(ProcessEvent::ErrorOutput { line }) => eprintln!("{line}"),
            AppEvent::Process(ProcessEvent::Detached { executable, pid }) => match pid {
                Some(pid) => self.show_status(&format!("Started {executable} (pid {pid})")),
                None => self.show_status(&format!("Started {executable}")),
            },
            _ => {}
        }
    }

    fn handle_transaction(&self, event: &TransactionEvent) {
        match event {
            TransactionEvent::Prepared {
                version, upgrade, ..
            } => {
                if *upgrade {
                    self.show_status(&format!("Adding modules to {version}"));
                } else {
                    self.show_status(&format!("Installing {version}"));
                }
            }
            TransactionEvent::Relocated { from, to, .. } => {
                self.show_status(&format!("Moved {from} -> {to}"));
            }
            TransactionEvent::PackageStarted { package, .. } => {
                self.show_status(&format!("Installing package {package}"));
            }
            TransactionEvent::PackageCompleted { package, .. } => {
                self.show_success(&format!("Installed package {package}"));
            }
            TransactionEvent::Completed {
                aborted: true, ..
            } => {
                self.show_status("Install aborted, cleaning up");
            }
            TransactionEvent::Restored { canonical, .. } => {
                self.show_status(&format!("Restored previous installation at {canonical}"));
            }
            TransactionEvent::Completed { .. } | TransactionEvent::RestoreFailed { .. } => {}
        }
    }

    fn show_status(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{}", Style::new().cyan().apply_to(message));
        } else {
            eprintln!("{message}");
        }
    }

    fn show_success(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{}", Style::new().green().apply_to(message));
        } else {
            eprintln!("{message}");
        }
    }
}
