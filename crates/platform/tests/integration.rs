//! Integration tests for platform

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use unityup_errors::{Error, InstallError, PlatformError};
    use unityup_events::{AppEvent, PlatformEvent, ProcessEvent};
    use unityup_platform::*;
    use unityup_types::ElevationMethod;

    /// Records every command and answers from a queue of canned outputs
    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<PlatformCommand>>,
        responses: Mutex<VecDeque<CommandOutput>>,
    }

    impl RecordingRunner {
        fn respond(self, exit_code: i32, stderr: &str) -> Self {
            self.responses.lock().unwrap().push_back(CommandOutput {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            });
            self
        }

        fn calls(&self) -> Vec<PlatformCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(
            &self,
            cmd: PlatformCommand,
            _cancel: &CancellationToken,
        ) -> Result<CommandOutput, Error> {
            self.calls.lock().unwrap().push(cmd);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn file_ops(runner: &Arc<RecordingRunner>, method: ElevationMethod) -> PrivilegedFileOps {
        PrivilegedFileOps::new(runner.clone(), Elevation::new(method))
    }

    #[tokio::test]
    async fn test_user_level_move_never_shells_out() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("Unity");
        tokio::fs::create_dir_all(source.join("Editor")).await.unwrap();
        tokio::fs::write(source.join("Editor/Unity"), b"bin").await.unwrap();
        let destination = temp.path().join("nested/dir/Unity 2021.3.5f1");

        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        ops.move_path(&source, &destination, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!source.exists());
        assert!(destination.join("Editor/Unity").exists());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_move_retries_once_elevated() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("missing");
        let destination = temp.path().join("target");

        let runner = Arc::new(RecordingRunner::default().respond(0, ""));
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        ops.move_path(&source, &destination, &CancellationToken::new())
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program(), "sudo");
        assert_eq!(calls[0].get_args()[0], "mv");
    }

    #[tokio::test]
    async fn test_move_onto_occupied_destination_never_nests() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("Unity");
        tokio::fs::create_dir_all(source.join("Editor")).await.unwrap();
        let destination = temp.path().join("occupied");
        tokio::fs::create_dir_all(&destination).await.unwrap();
        tokio::fs::write(destination.join("keep.txt"), b"keep").await.unwrap();

        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        let err = ops
            .move_path(&source, &destination, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::DestinationExists { .. })
        ));
        assert!(runner.calls().is_empty());
        assert!(source.join("Editor").is_dir());
        assert!(!destination.join("Unity").exists());
    }

    #[tokio::test]
    async fn test_elevated_failure_surfaces_stderr() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("missing");
        let destination = temp.path().join("target");

        let runner = Arc::new(RecordingRunner::default().respond(1, "mv: Permission denied\n"));
        let (tx, mut rx) = unityup_events::channel();
        let ops = file_ops(&runner, ElevationMethod::Sudo).with_events(tx);
        let err = ops
            .move_path(&source, &destination, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            Error::Platform(PlatformError::ElevationFailure {
                operation,
                exit_code,
                stderr,
                ..
            }) => {
                assert_eq!(operation, "move");
                assert_eq!(exit_code, 1);
                assert_eq!(stderr, "mv: Permission denied");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(runner.calls().len(), 1);

        let mut saw_retry = false;
        let mut saw_failure = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Platform(PlatformEvent::ElevationRetry { .. }) => saw_retry = true,
                AppEvent::Platform(PlatformEvent::ElevationFailed { .. }) => saw_failure = true,
                _ => {}
            }
        }
        assert!(saw_retry && saw_failure);
    }

    #[tokio::test]
    async fn test_disabled_elevation_reports_insufficient_privilege() {
        let temp = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::None);
        let err = ops
            .copy_path(
                &temp.path().join("missing"),
                &temp.path().join("copy"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::InsufficientPrivilege { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_path_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        ops.delete_path(&temp.path().join("nothing-here"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_copy_and_delete_tree() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("src");
        tokio::fs::create_dir_all(source.join("a/b")).await.unwrap();
        tokio::fs::write(source.join("a/b/file.txt"), b"hello").await.unwrap();
        #[cfg(unix)]
        tokio::fs::symlink("b/file.txt", source.join("a/link"))
            .await
            .unwrap();

        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        let cancel = CancellationToken::new();
        let copy = temp.path().join("copy");
        ops.copy_path(&source, &copy, &cancel).await.unwrap();

        let contents = tokio::fs::read_to_string(copy.join("a/b/file.txt"))
            .await
            .unwrap();
        assert_eq!(contents, "hello");
        #[cfg(unix)]
        assert!(tokio::fs::symlink_metadata(copy.join("a/link"))
            .await
            .unwrap()
            .file_type()
            .is_symlink());

        ops.delete_path(&copy, &cancel).await.unwrap();
        assert!(!copy.exists());
        assert!(source.exists());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_work() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("dir");
        tokio::fs::create_dir(&target).await.unwrap();

        let runner = Arc::new(RecordingRunner::default());
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = ops.delete_path(&target, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_run_elevated_wraps_command() {
        let runner = Arc::new(RecordingRunner::default().respond(0, ""));
        let ops = file_ops(&runner, ElevationMethod::Sudo);
        ops.run_elevated(
            "install",
            PlatformCommand::new("installer").args(["-pkg", "/tmp/Unity.pkg", "-target", "/"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        let calls = runner.calls();
        assert_eq!(calls[0].to_string(), "sudo installer -pkg /tmp/Unity.pkg -target /");
    }

    #[tokio::test]
    async fn test_run_checked_reports_exit_code() {
        let runner = RecordingRunner::default().respond(2, "boom");
        let err = runner
            .run_checked(PlatformCommand::new("false"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandFailed { exit_code: 2, .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_captures_output() {
        let runner = TokioProcessRunner::new();
        let output = runner
            .run(
                PlatformCommand::new("sh").args(["-c", "echo hi; echo oops >&2; exit 3"]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "hi");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_cancellation_returns_promptly() {
        let runner = TokioProcessRunner::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = runner
            .run(PlatformCommand::new("sleep").arg("5"), &cancel)
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_monitored_run_forwards_lines() {
        let (tx, mut rx) = unityup_events::channel();
        let code = run_monitored(
            &PlatformCommand::new("sh").args(["-c", "echo out; echo err >&2; exit 7"]),
            &tx,
            true,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(code, 7);

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Process(ProcessEvent::Output { line }) => stdout.push(line),
                AppEvent::Process(ProcessEvent::ErrorOutput { line }) => stderr.push(line),
                _ => {}
            }
        }
        assert_eq!(stdout, vec!["out".to_string()]);
        assert_eq!(stderr, vec!["err".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_monitored_run_survives_invalid_utf8() {
        let (tx, mut rx) = unityup_events::channel();
        let code = run_monitored(
            &PlatformCommand::new("sh").args([
                "-c",
                "printf 'a\\377b\\n'; sleep 0.3; echo after; exit 3",
            ]),
            &tx,
            true,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(code, 3);

        let mut stdout = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Process(ProcessEvent::Output { line }) = event {
                stdout.push(line);
            }
        }
        assert_eq!(stdout, vec!["a\u{FFFD}b".to_string(), "after".to_string()]);
    }

    #[tokio::test]
    async fn test_privilege_check_uses_net_session() {
        let runner = RecordingRunner::default().respond(2, "Access is denied.");
        assert!(!net_session_succeeds(&runner, &CancellationToken::new()).await);
        assert_eq!(runner.calls()[0].to_string(), "net session");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::{MetadataExt, PermissionsExt};
        use std::path::Path;

        /// A scratch directory on a different filesystem than `base`, if the
        /// host has one
        fn tempdir_on_other_device(base: &Path) -> Option<tempfile::TempDir> {
            let base_dev = std::fs::metadata(base).ok()?.dev();
            [env!("CARGO_TARGET_TMPDIR"), "/dev/shm", "/var/tmp"]
                .into_iter()
                .filter_map(|dir| tempfile::tempdir_in(dir).ok())
                .find(|dir| {
                    std::fs::metadata(dir.path()).is_ok_and(|m| m.dev() != base_dev)
                })
        }

        fn set_mode(path: &Path, mode: u32) {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
        }

        async fn editor_tree(root: &Path) {
            tokio::fs::create_dir_all(root.join("Editor/Data")).await.unwrap();
            tokio::fs::write(root.join("Editor/Unity"), b"bin").await.unwrap();
            tokio::fs::write(root.join("Editor/Data/info.txt"), b"data")
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_cross_device_move_copies_then_removes_source() {
            let temp = tempfile::tempdir().unwrap();
            let Some(other) = tempdir_on_other_device(temp.path()) else {
                return;
            };
            let source = temp.path().join("Unity");
            editor_tree(&source).await;
            let destination = other.path().join("Unity 2021.3.5f1");

            let runner = Arc::new(RecordingRunner::default());
            let ops = file_ops(&runner, ElevationMethod::Sudo);
            ops.move_path(&source, &destination, &CancellationToken::new())
                .await
                .unwrap();

            assert!(!source.exists());
            assert!(destination.join("Editor/Unity").is_file());
            assert!(destination.join("Editor/Data/info.txt").is_file());
            assert!(runner.calls().is_empty());
        }

        #[tokio::test]
        async fn test_cross_device_move_only_deletes_stuck_source() {
            if effective_uid_is_root() {
                return;
            }
            let temp = tempfile::tempdir().unwrap();
            let Some(other) = tempdir_on_other_device(temp.path()) else {
                return;
            };
            let parent = temp.path().join("locked");
            let source = parent.join("Unity");
            editor_tree(&source).await;
            // The source's own entry cannot be unlinked from a read-only parent
            set_mode(&parent, 0o555);
            let destination = other.path().join("Unity 2021.3.5f1");

            let runner = Arc::new(RecordingRunner::default().respond(0, ""));
            let ops = file_ops(&runner, ElevationMethod::Sudo);
            let result = ops
                .move_path(&source, &destination, &CancellationToken::new())
                .await;
            set_mode(&parent, 0o755);
            result.unwrap();

            let calls = runner.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(
                calls[0].get_args(),
                ["rm".to_string(), "-rf".to_string(), source.display().to_string()]
            );
            assert!(destination.join("Editor/Unity").is_file());
            assert!(!destination.join("Unity").exists());
        }

        #[tokio::test]
        async fn test_partial_directory_copy_retries_by_content() {
            if effective_uid_is_root() {
                return;
            }
            let temp = tempfile::tempdir().unwrap();
            let source = temp.path().join("payload");
            editor_tree(&source).await;
            let locked = source.join("Editor/Data/info.txt");
            set_mode(&locked, 0o000);
            let destination = temp.path().join("Unity");

            let runner = Arc::new(RecordingRunner::default().respond(0, ""));
            let ops = file_ops(&runner, ElevationMethod::Sudo);
            let result = ops
                .copy_path(&source, &destination, &CancellationToken::new())
                .await;
            set_mode(&locked, 0o644);
            result.unwrap();

            let calls = runner.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(
                calls[0].get_args(),
                [
                    "cp".to_string(),
                    "-R".to_string(),
                    source.join(".").display().to_string(),
                    destination.display().to_string(),
                ]
            );
        }
    }
}
