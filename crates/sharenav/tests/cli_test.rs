//! Integration tests for the `sharenav` CLI binary.
//!
//! Argument parsing, config handling, and full browse runs against a
//! mock directory and relay. Tokens come from `SHARENAV_TOKEN`, so the
//! keyring is never touched.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sharenav` binary with env isolation.
fn sharenav_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sharenav");
    cmd.env("HOME", "/tmp/sharenav-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sharenav-cli-test-nonexistent")
        .env_remove("SHARENAV_CONFIG")
        .env_remove("SHARENAV_TOKEN")
        .env_remove("SHARENAV_DIRECTORY_URL")
        .env_remove("SHARENAV_RELAY_URL")
        .env_remove("SHARENAV_IDENTITY")
        .env_remove("RUST_LOG");
    cmd
}

async fn mock_directory() -> MockServer {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(header("authorization", "Bearer t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "name": "home", "active": true, "session": "sess-1" },
            { "id": "s2", "name": "attic", "active": false, "session": "sess-2" },
            { "id": "s3", "name": "cabin", "active": true, "session": "sess-3" },
        ])))
        .mount(&mock)
        .await;
    mock
}

async fn mock_relay(mock: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/route"))
        .and(header("x-server-session", "sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "local_address": format!("{}/lan", mock.uri()),
            "remote_address": format!("{}/wan", mock.uri()),
        })))
        .mount(mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/wan/shares"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "m", "name": "Movies" },
            { "name": "Photos" },
        ])))
        .mount(mock)
        .await;
}

fn browse_cmd(mock: &MockServer) -> assert_cmd::Command {
    let mut cmd = sharenav_cmd();
    cmd.env("SHARENAV_TOKEN", "t-1")
        .args(["--directory", &mock.uri(), "--relay", &mock.uri()])
        .args(["--output", "plain", "browse"]);
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sharenav_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Expected 'Usage' in:\n{stderr}");
}

#[test]
fn test_help_lists_commands() {
    sharenav_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("browse")
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    sharenav_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sharenav"));
}

#[test]
fn test_completions_bash() {
    sharenav_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_share_requires_server() {
    sharenav_cmd()
        .args(["browse", "--share", "Movies"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path_str = path.to_str().unwrap();

    sharenav_cmd()
        .args(["--config", path_str, "--identity", "alice", "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    sharenav_cmd()
        .args(["--config", path_str, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identity = \"alice\""));

    sharenav_cmd()
        .args(["--config", path_str, "config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_init_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    sharenav_cmd()
        .args(["--config", path.to_str().unwrap()])
        .args(["--directory", "not a url", "config", "init"])
        .assert()
        .code(2);
    assert!(!path.exists());
}

#[test]
fn test_config_path_honours_flag() {
    sharenav_cmd()
        .args(["--config", "/tmp/elsewhere.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere.toml"));
}

// ── Browse ──────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_lists_active_servers() {
    let mock = mock_directory().await;

    browse_cmd(&mock)
        .assert()
        .success()
        .stdout(predicate::eq("home\ncabin\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_server_lists_shares() {
    let mock = mock_directory().await;
    mock_relay(&mock).await;

    browse_cmd(&mock)
        .args(["--server", "home"])
        .assert()
        .success()
        .stdout(predicate::eq("Movies\nPhotos\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_selects_share() {
    let mock = mock_directory().await;
    mock_relay(&mock).await;

    browse_cmd(&mock)
        .args(["--server", "s1", "--share", "photos"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Photos (Photos on s1)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_unknown_server() {
    let mock = mock_directory().await;

    browse_cmd(&mock)
        .args(["--server", "attic"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("attic"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_directory_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;

    browse_cmd(&mock)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("server list"));
}
