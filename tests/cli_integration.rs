//! Integration tests for the `tb` CLI.
//!
//! Each test works in a temp directory, runs `tb` as a subprocess, and
//! verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Get the path to the built `tb` binary.
fn tb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tb");
    path
}

fn tb(dir: &Path, args: &[&str]) -> Output {
    Command::new(tb_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_identity(dir: &Path) -> PathBuf {
    let path = dir.join("alice.json");
    fs::write(
        &path,
        r#"{
  "id": 7,
  "email": "alice@example.com",
  "roleId": 2,
  "permissions": {
    "task": { "edit": true, "delete": false },
    "member": { "view": true }
  }
}"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// init / config
// ---------------------------------------------------------------------------

#[test]
fn init_writes_template_once() {
    let tmp = TempDir::new().unwrap();

    let first = tb(tmp.path(), &["init"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stdout(&first).contains("Wrote taskboard.toml"));
    let written = fs::read_to_string(tmp.path().join("taskboard.toml")).unwrap();
    assert!(written.contains("timeout_minutes = 30"));

    let second = tb(tmp.path(), &["init"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already exists"));

    let forced = tb(tmp.path(), &["init", "--force"]);
    assert!(forced.status.success());
    assert!(stdout(&forced).contains("Overwrote"));
}

#[test]
fn config_show_without_file_prints_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = tb(tmp.path(), &["config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("session.timeout_minutes = 30"));
    assert!(text.contains("toasts.error_duration_ms = 7000"));
}

#[test]
fn config_show_json() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("taskboard.toml"),
        "[session]\ntimeout_minutes = 15\n",
    )
    .unwrap();

    let output = tb(tmp.path(), &["config", "show", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["session"]["timeout_minutes"], 15);
    assert_eq!(value["toasts"]["default_duration_ms"], 5000);
}

#[test]
fn set_timeout_edits_in_place() {
    let tmp = TempDir::new().unwrap();
    assert!(tb(tmp.path(), &["init"]).status.success());

    let output = tb(tmp.path(), &["config", "set-timeout", "45"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let written = fs::read_to_string(tmp.path().join("taskboard.toml")).unwrap();
    assert!(written.contains("timeout_minutes = 45"));
    assert!(written.contains("# Warn this many minutes before the inactivity logout"));
}

#[test]
fn set_timeout_rejects_zero() {
    let tmp = TempDir::new().unwrap();
    let output = tb(tmp.path(), &["config", "set-timeout", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("timeout_minutes must be at least 1"));
    assert!(!tmp.path().join("taskboard.toml").exists());
}

#[test]
fn set_timeout_rejects_more_than_a_week() {
    let tmp = TempDir::new().unwrap();
    assert!(tb(tmp.path(), &["init"]).status.success());

    let output = tb(tmp.path(), &["config", "set-timeout", "20000"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("timeout_minutes must be at most 10080"));
    let written = fs::read_to_string(tmp.path().join("taskboard.toml")).unwrap();
    assert!(written.contains("timeout_minutes = 30"));
}

#[test]
fn explicit_config_path_is_used() {
    let tmp = TempDir::new().unwrap();
    let custom = tmp.path().join("conf/board.toml");
    let custom_arg = custom.to_str().unwrap();

    assert!(tb(tmp.path(), &["--config", custom_arg, "init"]).status.success());
    assert!(custom.exists());
    assert!(!tmp.path().join("taskboard.toml").exists());
}

// ---------------------------------------------------------------------------
// check / permissions
// ---------------------------------------------------------------------------

#[test]
fn check_allows_granted_path() {
    let tmp = TempDir::new().unwrap();
    let identity = write_identity(tmp.path());
    let output = tb(
        tmp.path(),
        &["check", "task.edit", "--identity", identity.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "allow task.edit");
}

#[test]
fn check_denies_with_403_for_known_caller() {
    let tmp = TempDir::new().unwrap();
    let identity = write_identity(tmp.path());
    for path in ["task.delete", "project.create", "task"] {
        let output = tb(
            tmp.path(),
            &["check", path, "--identity", identity.to_str().unwrap()],
        );
        assert!(output.status.success());
        assert_eq!(
            stdout(&output).trim(),
            format!("deny {} (403 Permission denied)", path)
        );
    }
}

#[test]
fn check_without_identity_is_401() {
    let tmp = TempDir::new().unwrap();
    let output = tb(tmp.path(), &["check", "task.edit", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["decision"], "deny");
    assert_eq!(value["status"], 401);
    assert_eq!(value["message"], "Authentication required");
}

#[test]
fn check_uses_configured_messages() {
    let tmp = TempDir::new().unwrap();
    let identity = write_identity(tmp.path());
    fs::write(
        tmp.path().join("taskboard.toml"),
        "[auth]\nforbidden_message = \"Nope\"\n",
    )
    .unwrap();
    let output = tb(
        tmp.path(),
        &["check", "task.delete", "--identity", identity.to_str().unwrap()],
    );
    assert_eq!(stdout(&output).trim(), "deny task.delete (403 Nope)");
}

#[test]
fn permissions_lists_granted_paths() {
    let tmp = TempDir::new().unwrap();
    let identity = write_identity(tmp.path());
    let output = tb(
        tmp.path(),
        &["permissions", "--identity", identity.to_str().unwrap(), "--json"],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["email"], "alice@example.com");
    assert_eq!(
        value["permissions"],
        serde_json::json!(["member.view", "task.edit"])
    );
}

#[test]
fn unreadable_identity_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let output = tb(tmp.path(), &["permissions", "--identity", "missing.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("error: could not read missing.json"));
}
