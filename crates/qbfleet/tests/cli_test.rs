//! Integration tests for the `qbfleet` binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling — all without requiring a live qBittorrent host.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `qbfleet` binary with env isolation.
///
/// Clears all `QBFLEET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn qbfleet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("qbfleet");
    cmd.env("HOME", "/tmp/qbfleet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/qbfleet-cli-test-nonexistent")
        .env_remove("QBFLEET_CONFIG")
        .env_remove("QBFLEET_OUTPUT")
        .env_remove("QBFLEET_TIMEOUT");
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
    let output = qbfleet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    qbfleet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("qBittorrent")
            .and(predicate::str::contains("hosts"))
            .and(predicate::str::contains("torrents"))
            .and(predicate::str::contains("monitor")),
    );
}

#[test]
fn test_version_flag() {
    qbfleet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qbfleet"));
}

#[test]
fn test_invalid_subcommand_fails() {
    qbfleet_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    qbfleet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    qbfleet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qbfleet"));
}

// ── Config handling ─────────────────────────────────────────────────

#[test]
fn test_hosts_list_with_empty_config_shows_no_hosts() {
    // No config file exists: host set is empty, list succeeds and
    // prints nothing in plain mode.
    qbfleet_cmd()
        .args(["hosts", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().or(predicate::str::contains("\n").not()));
}

#[test]
fn test_hosts_list_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        r#"
        [[hosts]]
        name = "seedbox"
        host = "10.0.0.5"
        username = "admin"
        password = "pw"
        "#,
    )
    .unwrap();

    qbfleet_cmd()
        .args(["--config"])
        .arg(&config)
        .args(["hosts", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seedbox"));
}

#[test]
fn test_unknown_host_exits_with_not_found_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    qbfleet_cmd()
        .args(["--config"])
        .arg(&config)
        .args(["torrents", "list", "--host", "ghost"])
        .assert()
        .failure()
        .code(4);
}

/// Config file with one host pointing at an address nothing listens on.
fn dead_host_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[[hosts]]\n\
             name = \"deadbox\"\n\
             host = \"{}\"\n\
             port = {}\n\
             username = \"admin\"\n\
             password = \"pw\"\n",
            addr.ip(),
            addr.port()
        ),
    )
    .unwrap();
    config
}

#[test]
fn test_hosts_test_reports_down_host_with_exit_code_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dead_host_config(&dir);

    qbfleet_cmd()
        .args(["--config"])
        .arg(&config)
        .args(["hosts", "test", "-o", "plain"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("deadbox offline"))
        .stderr(predicate::str::contains("offline"));
}

#[test]
fn test_monitor_once_exits_nonzero_when_a_host_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let config = dead_host_config(&dir);

    qbfleet_cmd()
        .args(["--config"])
        .arg(&config)
        .args(["monitor", "--once", "-q"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_delete_requires_hashes() {
    qbfleet_cmd()
        .args(["torrents", "delete", "--host", "seedbox"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_delete_without_yes_in_non_tty_is_safe() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        r#"
        [[hosts]]
        name = "seedbox"
        host = "10.0.0.5"
        username = "admin"
        password = "pw"
        "#,
    )
    .unwrap();

    // Without -y and without a TTY the confirmation cannot be given;
    // the command must not report success silently deleting anything.
    let output = qbfleet_cmd()
        .args(["--config"])
        .arg(&config)
        .args(["torrents", "delete", "--host", "seedbox", "aaa"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_ne!(output.status.code(), Some(0));
}
