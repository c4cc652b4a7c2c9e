//! Integration tests for events

#[cfg(test)]
mod tests {
    use unityup_errors::{InstallError, UserFacingError};
    use unityup_events::*;

    #[tokio::test]
    async fn test_event_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error_with_details("restore failed", "/Applications/Unity");
        tx.emit_operation_failed("uninstall 2021.3.5f1", "permission denied");
        tx.emit_process_output("Loading editor");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(event1, AppEvent::General(GeneralEvent::Error { .. })));

        let event2 = rx.recv().await.unwrap();
        assert_eq!(event2.log_level(), tracing::Level::ERROR);
        match event2 {
            AppEvent::General(GeneralEvent::OperationFailed { operation, error }) => {
                assert_eq!(operation, "uninstall 2021.3.5f1");
                assert_eq!(error, "permission denied");
            }
            other => panic!("unexpected event {other:?}"),
        }

        let event3 = rx.recv().await.unwrap();
        match event3 {
            AppEvent::Process(ProcessEvent::Output { line }) => assert_eq!(line, "Loading editor"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_operation_started("ignored");
    }

    #[test]
    fn test_optional_sender_without_listener() {
        let sender: Option<EventSender> = None;
        sender.emit_operation_completed("nobody is listening", true);
    }

    #[test]
    fn test_process_output_levels() {
        let stdout = AppEvent::Process(ProcessEvent::Output {
            line: "ok".to_string(),
        });
        let stderr = AppEvent::Process(ProcessEvent::ErrorOutput {
            line: "bad".to_string(),
        });
        assert_eq!(stdout.log_level(), tracing::Level::INFO);
        assert_eq!(stderr.log_level(), tracing::Level::ERROR);
        assert_eq!(stdout.log_target(), "unityup::events::process");
    }

    #[test]
    fn test_restore_failure_is_error_level() {
        let err = InstallError::RestoreFailed {
            fallback: "/Applications/Unity (Moved by unityup)".to_string(),
            canonical: "/Applications/Unity".to_string(),
            message: "permission denied".to_string(),
        };
        let event = AppEvent::Transaction(TransactionEvent::RestoreFailed {
            id: uuid::Uuid::new_v4(),
            fallback: "/Applications/Unity (Moved by unityup)".to_string(),
            canonical: "/Applications/Unity".to_string(),
            failure: FailureContext::from_error(&err),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
        assert_eq!(err.user_code(), Some("install.restore_failed"));
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Platform(PlatformEvent::ElevationRetry {
            operation: "move".to_string(),
            path: "/Applications/Unity".to_string(),
            reason: "permission denied".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""domain":"platform""#));
        assert!(json.contains(r#""event_type":"elevation_retry""#));
    }
}
