//! Structured logging integration for events
//!
//! Converts [`AppEvent`]s into tracing records. The level comes from
//! [`AppEvent::log_level`]; each record carries the event's domain as
//! `source` so file logs can be filtered per domain.

use tracing::Level;
use unityup_events::{AppEvent, GeneralEvent, PlatformEvent, ProcessEvent, TransactionEvent};

/// tracing macros need the level at compile time
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

/// Log an `AppEvent` with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();
    let source = event.log_target();

    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Error { message, details } => {
                log_at!(level, source, details = ?details, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                log_at!(level, source, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                log_at!(level, source, operation = %operation, success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, error } => {
                log_at!(level, source, operation = %operation, error = %error, "Operation failed");
            }
        },

        AppEvent::Transaction(transaction) => match transaction {
            TransactionEvent::Prepared {
                id,
                version,
                upgrade,
            } => {
                log_at!(level, source, transaction = %id, version = %version, upgrade, "Install transaction prepared");
            }
            TransactionEvent::Relocated { id, from, to } => {
                log_at!(level, source, transaction = %id, from = %from, to = %to, "Installation relocated");
            }
            TransactionEvent::PackageStarted {
                id,
                package,
                file_type,
            } => {
                log_at!(level, source, transaction = %id, package = %package, file_type = %file_type, "Package installation started");
            }
            TransactionEvent::PackageCompleted { id, package } => {
                log_at!(level, source, transaction = %id, package = %package, "Package installation completed");
            }
            TransactionEvent::Completed {
                id,
                version,
                aborted,
                destination,
            } => {
                log_at!(level, source, transaction = %id, version = %version, aborted, destination = ?destination, "Install transaction completed");
            }
            TransactionEvent::Restored {
                id,
                fallback,
                canonical,
            } => {
                log_at!(level, source, transaction = %id, fallback = %fallback, canonical = %canonical, "Parked installation restored");
            }
            TransactionEvent::RestoreFailed {
                id,
                fallback,
                canonical,
                failure,
            } => {
                log_at!(
                    level,
                    source,
                    transaction = %id,
                    fallback = %fallback,
                    canonical = %canonical,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Parked installation could not be restored"
                );
            }
        },

        AppEvent::Platform(platform) => match platform {
            PlatformEvent::ProcessExecutionStarted {
                command,
                args,
                elevated,
            } => {
                log_at!(level, source, command = %command, args = ?args, elevated, "Process started");
            }
            PlatformEvent::ProcessExecutionCompleted {
                command,
                exit_code,
                duration_ms,
            } => {
                log_at!(level, source, command = %command, exit_code, duration_ms, "Process completed");
            }
            PlatformEvent::ProcessExecutionFailed { command, error } => {
                log_at!(level, source, command = %command, error = %error, "Process failed");
            }
            PlatformEvent::ElevationRetry {
                operation,
                path,
                reason,
            } => {
                log_at!(level, source, operation = %operation, path = %path, reason = %reason, "Retrying with elevated rights");
            }
            PlatformEvent::ElevationFailed {
                operation,
                path,
                failure,
            } => {
                log_at!(
                    level,
                    source,
                    operation = %operation,
                    path = %path,
                    code = ?failure.code,
                    message = %failure.message,
                    "Elevated operation failed"
                );
            }
        },

        AppEvent::Process(process) => match process {
            ProcessEvent::Spawned { executable, pid } => {
                log_at!(level, source, executable = %executable, pid = ?pid, "Editor started");
            }
            ProcessEvent::Output { line } => {
                log_at!(level, source, stream = "stdout", "{line}");
            }
            ProcessEvent::ErrorOutput { line } => {
                log_at!(level, source, stream = "stderr", "{line}");
            }
            ProcessEvent::Exited { code } => {
                log_at!(level, source, code, "Editor exited");
            }
            ProcessEvent::Detached { executable, pid } => {
                log_at!(level, source, executable = %executable, pid = ?pid, "Editor detached");
            }
        },
    }
}
