//! Integration tests for config

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;
    use unityup_config::*;
    use unityup_types::ElevationMethod;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var("UNITYUP_INSTALL_PATH");
        std::env::remove_var("UNITYUP_CANONICAL_PATH");
        std::env::remove_var("UNITYUP_ELEVATION");
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[install]
paths = "/Applications/Unity {{major}}.{{minor}};/Volumes/Editors/{{build}}"
canonical_path = "/Applications/UnityCurrent"
search_roots = ["/Volumes/Editors"]

[elevation]
method = "none"

[process]
log_output = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(
            config.install_templates(),
            Some("/Applications/Unity {major}.{minor};/Volumes/Editors/{build}")
        );
        assert_eq!(
            config.canonical_path_or(fixed_paths::macos::CANONICAL_PATH),
            PathBuf::from("/Applications/UnityCurrent")
        );
        assert_eq!(config.install.search_roots, vec![PathBuf::from("/Volumes/Editors")]);
        assert_eq!(config.elevation.method, ElevationMethod::None);
        assert!(!config.process.log_output);
    }

    #[tokio::test]
    async fn test_empty_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert!(config.install_templates().is_none());
        assert_eq!(config.elevation.method, ElevationMethod::Auto);
        assert!(config.process.log_output);
        assert_eq!(
            config.canonical_path_or(fixed_paths::linux::CANONICAL_PATH),
            PathBuf::from("/opt/Unity")
        );
    }

    #[tokio::test]
    async fn test_invalid_toml_is_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[install\npaths = 3").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            unityup_errors::Error::Config(unityup_errors::ConfigError::ParseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.install.paths = Some("/tmp/{major}".to_string());
        config.elevation.method = ElevationMethod::Sudo;
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(loaded.install_templates(), Some("/tmp/{major}"));
        assert_eq!(loaded.elevation.method, ElevationMethod::Sudo);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("UNITYUP_INSTALL_PATH", "/opt/unity/{major}.{minor}");
        std::env::set_var("UNITYUP_CANONICAL_PATH", "/opt/UnityCurrent");
        std::env::set_var("UNITYUP_ELEVATION", "sudo");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.install_templates(), Some("/opt/unity/{major}.{minor}"));
        assert_eq!(
            config.install.canonical_path,
            Some(PathBuf::from("/opt/UnityCurrent"))
        );
        assert_eq!(config.elevation.method, ElevationMethod::Sudo);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("UNITYUP_ELEVATION", "doas");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_fallback_path_appends_marker() {
        let fallback = fallback_path(Path::new("/Applications/Unity"));
        assert_eq!(
            fallback,
            PathBuf::from("/Applications/Unity (Moved by unityup)")
        );
    }
}
