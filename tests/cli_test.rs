// tests/cli_test.rs
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_azcli-wrap"))
        .args(args)
        .current_dir(dir)
        .env_remove("AZ_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run command")
}

/// Write an executable stand-in for az that prints `stdout` and exits with `code`
fn fake_az(dir: &Path, stdout: &str, code: i32) -> PathBuf {
    let path = dir.join("fake-az");
    let script = format!("#!/bin/sh\ncat <<'JSON'\n{}\nJSON\nexit {}\n", stdout, code);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".azcli-wrap.toml");

    let output = run(
        temp_dir.path(),
        &["init", "--resource-group", "rg-test", "--location", "westus"],
    );

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_path.exists(), "Config file not created");

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("resource_group = \"rg-test\""));
    assert!(content.contains("location = \"westus\""));
    assert!(content.contains("az_path = \"az\""));
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".azcli-wrap.toml");
    fs::write(&config_path, "existing").unwrap();

    let output = run(temp_dir.path(), &["init"]);

    assert!(!output.status.success(), "Should have failed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("already exists") || stderr.contains("force"),
        "Expected error about existing file or force flag, got: {}",
        stderr
    );
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing");
}

#[test]
fn test_storage_connection_string_through_fake_az() {
    let temp_dir = TempDir::new().unwrap();
    let az = fake_az(
        temp_dir.path(),
        r#"{"connectionString": "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=abc=="}"#,
        0,
    );

    let output = run(
        temp_dir.path(),
        &[
            "--az-path",
            az.to_str().unwrap(),
            "storage",
            "connection-string",
            "acct",
            "-g",
            "rg",
        ],
    );

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=abc=="
    );
}

#[test]
fn test_resource_group_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let az = fake_az(temp_dir.path(), "\"https://acct.table.core.windows.net/\"", 0);
    fs::write(
        temp_dir.path().join(".azcli-wrap.toml"),
        format!("az_path = \"{}\"\nresource_group = \"rg-config\"\n", az.display()),
    )
    .unwrap();

    let output = run(temp_dir.path(), &["storage", "url", "acct", "--type", "table"]);

    assert!(
        output.status.success(),
        "Command failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "\"https://acct.table.core.windows.net/\""
    );
}

#[test]
fn test_invalid_storage_type_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        temp_dir.path(),
        &["--az-path", "/nonexistent/az", "storage", "url", "acct", "-g", "rg", "--type", "disk"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid storage type 'disk'"), "got: {}", stderr);
}

#[test]
fn test_az_failure_exit_code_surfaces() {
    let temp_dir = TempDir::new().unwrap();
    let az = fake_az(temp_dir.path(), "", 2);

    let output = run(
        temp_dir.path(),
        &["--az-path", az.to_str().unwrap(), "storage", "keys", "acct", "-g", "rg"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exited with code 2"), "got: {}", stderr);
}

#[test]
fn test_missing_resource_group_names_flag() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["storage", "keys", "acct"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--resource-group"), "got: {}", stderr);
}
