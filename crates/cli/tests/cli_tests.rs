//! CLI integration tests

use std::process::Command;
use tempfile::TempDir;

fn dmctl() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dmctl"));
    // Keep the developer's own config file and env out of the run
    let home = std::env::temp_dir().join("dmctl-test-home");
    command.env("HOME", home).env_remove("DM_API_URL");
    command
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = dmctl()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Decision Maker"), "Should show app name");
    assert!(stdout.contains("intents"), "Should show intents command");
    assert!(stdout.contains("metrics"), "Should show metrics command");
    assert!(stdout.contains("pods"), "Should show pods command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = dmctl()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("dmctl"), "Should show binary name");
}

#[test]
fn test_intents_help() {
    let output = dmctl()
        .args(["intents", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Intents help should succeed");
    assert!(stdout.contains("list"), "Should show list subcommand");
    assert!(stdout.contains("submit"), "Should show submit subcommand");
}

#[test]
fn test_metrics_help() {
    let output = dmctl()
        .args(["metrics", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Metrics help should succeed");
    assert!(stdout.contains("show"), "Should show show subcommand");
    assert!(stdout.contains("push"), "Should show push subcommand");
}

/// Test that a missing intents file fails before any request is made
#[test]
fn test_submit_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.json");

    let output = dmctl()
        .args(["--api-url", "http://127.0.0.1:1"])
        .args(["intents", "submit"])
        .arg(&missing)
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Submit should fail");
    assert!(stderr.contains("Failed to read"), "Should name the read failure");
}

#[test]
fn test_push_invalid_json_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("metrics.json");
    std::fs::write(&file, "{\"nr_queued\": \"lots\"}").unwrap();

    let output = dmctl()
        .args(["--api-url", "http://127.0.0.1:1"])
        .args(["metrics", "push"])
        .arg(&file)
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Push should fail");
    assert!(stderr.contains("Invalid JSON"), "Should name the parse failure");
}

#[test]
fn test_unreachable_api_fails() {
    let output = dmctl()
        .args(["--api-url", "http://127.0.0.1:1", "pods"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Pods should fail without a server");
}

#[test]
fn test_invalid_api_url_fails() {
    let output = dmctl()
        .args(["--api-url", "not a url", "health"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Health should fail");
    assert!(stderr.contains("invalid API URL"), "Should report the bad URL");
}
