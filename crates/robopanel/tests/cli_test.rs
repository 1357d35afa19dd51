//! Integration tests for the `robopanel` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling — all without requiring a live store.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `robopanel` binary with env isolation.
///
/// Clears all `ROBOPANEL_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn robopanel_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("robopanel");
    cmd.env("HOME", "/tmp/robopanel-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/robopanel-cli-test-nonexistent")
        .env_remove("ROBOPANEL_PROFILE")
        .env_remove("ROBOPANEL_DATABASE_URL")
        .env_remove("ROBOPANEL_AUTH_TOKEN")
        .env_remove("ROBOPANEL_ADMIN")
        .env_remove("ROBOPANEL_OUTPUT")
        .env_remove("ROBOPANEL_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = robopanel_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    robopanel_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("minrobot")
            .and(predicate::str::contains("display"))
            .and(predicate::str::contains("emergency"))
            .and(predicate::str::contains("alerts")),
    );
}

#[test]
fn test_version_flag() {
    robopanel_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("robopanel"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    robopanel_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    robopanel_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = robopanel_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_display_no_store_configured() {
    robopanel_cmd()
        .args(["display", "HELLO"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("store")
                .or(predicate::str::contains("config"))
                .or(predicate::str::contains("database")),
        );
}

#[test]
fn test_overlong_display_text_rejected_locally() {
    // Validation happens before any network activity, so a dummy URL is
    // enough — the process must fail with a usage error, not a
    // connection error.
    let long_text = "A".repeat(40);
    let output = robopanel_cmd()
        .args([
            "--database-url",
            "http://127.0.0.1:1/",
            "display",
            &long_text,
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("32"),
        "Expected the character limit in the error:\n{text}"
    );
}

#[test]
fn test_emergency_requires_admin_id() {
    let output = robopanel_cmd()
        .args([
            "--database-url",
            "http://127.0.0.1:1/",
            "emergency",
            "activate",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected permission exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("admin"),
        "Expected a hint about the admin id:\n{text}"
    );
}

#[test]
fn test_unlisted_admin_rejected_before_network() {
    let output = robopanel_cmd()
        .args([
            "--database-url",
            "http://127.0.0.1:1/",
            "--admin",
            "app_user",
            "emergency",
            "activate",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected permission exit code");
}

#[test]
fn test_invalid_output_format() {
    let output = robopanel_cmd()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values") || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    robopanel_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_path_prints_a_path() {
    robopanel_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_emergency_subcommands_exist() {
    robopanel_cmd()
        .args(["emergency", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("activate").and(predicate::str::contains("deactivate")),
        );
}

#[test]
fn test_alerts_subcommands_exist() {
    robopanel_cmd()
        .args(["alerts", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("dismiss"))
                .and(predicate::str::contains("raise")),
        );
}
