//! Integration tests for error types

#[cfg(test)]
mod tests {
    use unityup_errors::*;

    #[test]
    fn test_error_conversion() {
        let install_err = InstallError::NoActiveTransaction;
        let err: Error = install_err.into();
        assert!(matches!(err, Error::Install(InstallError::NoActiveTransaction)));
    }

    #[test]
    fn test_error_display() {
        let err = InstallError::DestinationExists {
            path: "/Applications/Unity".into(),
        };
        assert_eq!(
            err.to_string(),
            "destination already exists: /Applications/Unity"
        );
    }

    #[test]
    fn test_elevation_failure_carries_stderr() {
        let err: Error = PlatformError::ElevationFailure {
            operation: "move".into(),
            command: "sudo".into(),
            exit_code: 1,
            stderr: "mv: permission denied".into(),
        }
        .into();
        assert!(err.user_message().contains("mv: permission denied"));
        assert_eq!(err.user_code(), Some("platform.elevation_failure"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
    }

    #[test]
    fn test_cancelled_detection() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::internal("boom").is_cancelled());
    }

    #[test]
    fn test_every_install_error_has_code() {
        let errors = [
            InstallError::AlreadyInstalling {
                version: "2021.3.5f1".into(),
            },
            InstallError::NoActiveTransaction,
            InstallError::FallbackPathOccupied {
                canonical: "a".into(),
                fallback: "b".into(),
            },
            InstallError::VersionNotInstalled {
                version: "2021.3.5f1".into(),
            },
            InstallError::EditorNotInstalledFirst {
                package: "Android".into(),
            },
            InstallError::UnsupportedPackageType {
                package: "Docs".into(),
                file_type: "rar".into(),
            },
            InstallError::ExecutableNotFound { path: "x".into() },
        ];
        for err in &errors {
            assert!(err.user_code().is_some(), "{err} has no code");
        }
    }
}
