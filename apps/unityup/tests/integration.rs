//! Integration tests for the unityup CLI

use std::path::Path;
use std::process::Command;

fn unityup(config_root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_unityup"));
    cmd.env("UNITYUP_CANONICAL_PATH", config_root.join("Unity"))
        .env("UNITYUP_ELEVATION", "none")
        .env_remove("UNITYUP_INSTALL_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// Config file whose only search root is `root`
fn write_config(root: &Path) -> std::path::PathBuf {
    let path = root.join("config.toml");
    let contents = format!(
        "[install]\nsearch_roots = [{:?}]\n\n[process]\nlog_output = true\n",
        root.display().to_string()
    );
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_unityup"))
        .arg("--version")
        .output()
        .expect("Failed to execute unityup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unityup"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_unityup"))
        .arg("--help")
        .output()
        .expect("Failed to execute unityup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["install", "list", "run", "move", "uninstall", "check-privileges"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_install_requires_packages() {
    let output = Command::new(env!("CARGO_BIN_EXE_unityup"))
        .args(["install", "2021.3.5f1"])
        .output()
        .expect("Failed to execute unityup");
    assert!(!output.status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_unityup"))
        .args(["install", "2021.3.5f1", "Unity"])
        .output()
        .expect("Failed to execute unityup");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("NAME=PATH"));
}

#[test]
fn test_invalid_version_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_unityup"))
        .args(["uninstall", "2021.3"])
        .output()
        .expect("Failed to execute unityup");
    assert!(!output.status.success());
}

#[test]
fn test_invalid_env_config() {
    let temp = tempfile::tempdir().unwrap();
    let output = unityup(temp.path())
        .env("UNITYUP_ELEVATION", "maybe")
        .args(["--config"])
        .arg(write_config(temp.path()))
        .arg("list")
        .output()
        .expect("Failed to execute unityup");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("UNITYUP_ELEVATION"));
}

#[test]
fn test_check_privileges_json() {
    let temp = tempfile::tempdir().unwrap();
    let output = unityup(temp.path())
        .arg("--config")
        .arg(write_config(temp.path()))
        .args(["--json", "check-privileges"])
        .output()
        .expect("Failed to execute unityup");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["result"], "privileges");
    assert_eq!(json["elevation"], "none");
    assert!(json["privileged"].is_boolean());
}

#[test]
fn test_uninstall_unknown_version() {
    let temp = tempfile::tempdir().unwrap();
    let output = unityup(temp.path())
        .arg("--config")
        .arg(write_config(temp.path()))
        .args(["uninstall", "1999.1.0f1"])
        .output()
        .expect("Failed to execute unityup");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1999.1.0f1"));
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_editor(root: &Path, script: &str) {
        let executable = root.join("Editor/Unity");
        std::fs::create_dir_all(executable.parent().unwrap()).unwrap();
        std::fs::write(&executable, script).unwrap();
        std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_list_json() {
        let temp = tempfile::tempdir().unwrap();
        fake_editor(&temp.path().join("Unity 2021.3.5f1"), "#!/bin/sh\n");

        let output = unityup(temp.path())
            .arg("--config")
            .arg(write_config(temp.path()))
            .args(["--json", "list"])
            .output()
            .expect("Failed to execute unityup");

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let installations = json["installations"].as_array().unwrap();
        assert!(installations
            .iter()
            .any(|i| i["root"] == temp.path().join("Unity 2021.3.5f1").display().to_string()));
    }

    #[test]
    fn test_run_exits_with_editor_code() {
        let temp = tempfile::tempdir().unwrap();
        fake_editor(
            &temp.path().join("Unity 2021.3.5f1"),
            "#!/bin/sh\necho \"editor $*\"\nexit 7\n",
        );

        let output = unityup(temp.path())
            .arg("--config")
            .arg(write_config(temp.path()))
            .args(["--color", "never", "run", "2021.3.5f1", "--", "-batchmode"])
            .output()
            .expect("Failed to execute unityup");

        assert_eq!(output.status.code(), Some(7));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("editor -batchmode -logFile -"));
    }

    #[test]
    fn test_move_then_uninstall() {
        let temp = tempfile::tempdir().unwrap();
        let original = temp.path().join("Unity 2021.3.5f1");
        fake_editor(&original, "#!/bin/sh\n");
        let config = write_config(temp.path());
        let moved = temp.path().join("Unity-2021.3.5f1-moved");

        let output = unityup(temp.path())
            .arg("--config")
            .arg(&config)
            .args(["move", "2021.3.5f1"])
            .arg(&moved)
            .output()
            .expect("Failed to execute unityup");
        assert!(output.status.success());
        assert!(moved.join("Editor/Unity").is_file());
        assert!(!original.exists());

        let output = unityup(temp.path())
            .arg("--config")
            .arg(&config)
            .args(["uninstall", "2021.3.5f1"])
            .output()
            .expect("Failed to execute unityup");
        assert!(output.status.success());
        assert!(!moved.exists());
    }
}
