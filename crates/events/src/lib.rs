#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in unityup
//!
//! Library crates never print. Everything a user might want to see (warnings,
//! elevated retries, transaction progress, editor output) goes through an
//! [`AppEvent`] channel that the CLI drains and logs via tracing.

pub mod events;
pub use events::{
    AppEvent, FailureContext, GeneralEvent, PlatformEvent, ProcessEvent, TransactionEvent,
};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout unityup
///
/// Works the same whether you hold a raw `EventSender` or a struct that
/// contains one (or optionally contains one).
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit an error event with details
    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    /// Emit a transaction lifecycle event
    fn emit_transaction(&self, event: TransactionEvent) {
        self.emit(AppEvent::Transaction(event));
    }

    /// Emit a platform (command execution) event
    fn emit_platform(&self, event: PlatformEvent) {
        self.emit(AppEvent::Platform(event));
    }

    /// Forward one line of child stdout
    fn emit_process_output(&self, line: impl Into<String>) {
        self.emit(AppEvent::Process(ProcessEvent::Output { line: line.into() }));
    }

    /// Forward one line of child stderr
    fn emit_process_error(&self, line: impl Into<String>) {
        self.emit(AppEvent::Process(ProcessEvent::ErrorOutput {
            line: line.into(),
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Optional sender, for components that may run without a listener
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
