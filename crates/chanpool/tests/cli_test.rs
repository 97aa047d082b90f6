//! Integration tests for the `chanpool` binary.
//!
//! Argument parsing, help, completions, config handling and error exit
//! codes. None of these reach a TeamSpeak server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
fn chanpool_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("chanpool");
    cmd.env("HOME", "/tmp/chanpool-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/chanpool-cli-test-nonexistent")
        .env_remove("CHANPOOL_CONFIG")
        .env_remove("TS_HOST")
        .env_remove("TS_QUERYPORT")
        .env_remove("TS_SERVERPORT")
        .env_remove("TS_API_KEY")
        .env_remove("CHAT_PARENT_ID")
        .env_remove("TRAINING_PARENT_ID")
        .env_remove("RUST_LOG");
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = chanpool_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    chanpool_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    chanpool_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chanpool"));
}

#[test]
fn test_completions_bash() {
    chanpool_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chanpool"));
}

#[test]
fn test_unknown_output_format_is_usage_error() {
    chanpool_cmd()
        .args(["plan", "--output", "yaml"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_explicit_config_file() {
    chanpool_cmd()
        .args(["--config", "/tmp/chanpool-cli-test-nonexistent/none.toml", "plan"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_no_groups_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\napi_key = \"abc\"\n").unwrap();

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .arg("run")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No channel groups"));
}

#[test]
fn test_no_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[groups.chat]\nparent = 3\n").unwrap();

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .arg("plan")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn test_bad_template_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[server]\napi_key = \"abc\"\n[groups.training]\nparent = 4\ntemplate = \"Training\"\n",
    )
    .unwrap();

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .arg("plan")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("groups.training.template"));
}

#[test]
fn test_unknown_group_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\napi_key = \"abc\"\n[groups.chat]\nparent = 3\n").unwrap();

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .args(["plan", "--group", "lobby"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("lobby"));
}

// ── config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chanpool").join("config.toml");

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("--force"));

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("query_port = 10080")
                .and(predicate::str::contains("Training {n}")),
        );
}

#[test]
fn test_config_show_redacts_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\napi_key = \"super-secret\"\n").unwrap();

    chanpool_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret").not());
}

#[test]
fn test_config_path_honours_flag() {
    chanpool_cmd()
        .args(["--config", "/etc/chanpool/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/chanpool/custom.toml"));
}
