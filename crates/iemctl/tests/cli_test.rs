//! Integration tests for the `iemctl` binary.
//!
//! Parsing, help, completions and error exit codes run without any IEM;
//! deployment flows run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `iemctl` binary with env isolation.
///
/// Clears every variable the CLI reads and points config directories at
/// a nonexistent path so tests never touch a real configuration.
fn iemctl() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("iemctl");
    cmd.env("HOME", "/tmp/iemctl-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/iemctl-test-nonexistent")
        .env_remove("IE_URL")
        .env_remove("IE_USER")
        .env_remove("IE_PASSWORD")
        .env_remove("IED_NAME")
        .env_remove("APP_ID")
        .env_remove("IE_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// `iemctl` pointed at `url` with credentials set.
fn connected(url: &str) -> assert_cmd::Command {
    let mut cmd = iemctl();
    cmd.env("IE_URL", url)
        .env("IE_USER", "admin")
        .env("IE_PASSWORD", "pw");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mock_iem() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"access_token": "tok123"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/portal/api/v1/devices"))
        .and(query_param("size", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"deviceId": "d-1", "deviceName": "edge-01"},
            {"deviceId": "d-3", "deviceName": "edge-03"}
        ]})))
        .mount(&server)
        .await;
    server
}

async fn mount_deploy(server: &MockServer, device_id: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/p.service/api/v4/applications/app-1/versions/v-9/batch"))
        .and(query_param("operation", "installApplication"))
        .and(body_string_contains(device_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "batch-1"})))
        .expect(expected)
        .mount(server)
        .await;
}

fn statuses(stdout: &[u8]) -> Vec<String> {
    let report: Value = serde_json::from_slice(stdout).unwrap();
    report
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["status"].as_str().unwrap().to_owned())
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = iemctl().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    iemctl().arg("--help").assert().success().stdout(
        predicate::str::contains("pipeline")
            .and(predicate::str::contains("standalone"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("configs")),
    );
}

#[test]
fn test_version_flag() {
    iemctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iemctl"));
}

#[test]
fn test_completions_zsh() {
    iemctl()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_pipeline_help_shows_flags() {
    iemctl()
        .args(["pipeline", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--devices")
                .and(predicate::str::contains("--app-version-id"))
                .and(predicate::str::contains("--on-failure")),
        );
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_url_is_usage_error() {
    let output = iemctl()
        .args(["devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("IE_URL"));
}

#[test]
fn test_legacy_flag_spellings_parse() {
    // Parsing succeeds; the failure is the missing URL, not the flags.
    let output = iemctl()
        .args([
            "pipeline",
            "--devices",
            "edge-01",
            "--app_id",
            "app-1",
            "--appVersionID",
            "v-9",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("IE_URL"));
}

#[test]
fn test_pipeline_without_app_id_names_env_var() {
    let output = connected("http://127.0.0.1:1")
        .args(["pipeline", "--devices", "edge-01", "--app-version-id", "v-9"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("APP_ID"));
}

#[test]
fn test_config_show_redacts_password() {
    iemctl()
        .env("IE_URL", "https://iem.local")
        .env("IE_PASSWORD", "hunter2")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://iem.local")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_file_is_layered_under_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "url = \"https://file.local\"\nusername = \"operator\"\non_failure = \"continue\"\n",
    )
    .unwrap();

    iemctl()
        .env("IE_USER", "admin")
        .arg("--config")
        .arg(&path)
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://file.local")
                .and(predicate::str::contains("\"admin\""))
                .and(predicate::str::contains("\"continue\""))
                .and(predicate::str::contains("operator").not()),
        );
}

#[test]
fn test_config_path_honours_flag() {
    iemctl()
        .args(["--config", "/tmp/iemctl-test/custom.toml", "-o", "plain", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/iemctl-test/custom.toml"));
}

#[test]
fn test_bad_schedule_is_usage_error() {
    let output = connected("http://127.0.0.1:1")
        .args(["install", "--app", "app-1", "--device", "edge-01", "--schedule", "tomorrow"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("schedule"));
}

#[test]
fn test_unreachable_iem_is_connection_error() {
    let output = connected("http://127.0.0.1:1")
        .arg("login")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_unreachable_iem_prints_flat_result_as_json() {
    let output = connected("http://127.0.0.1:1")
        .args(["-o", "json", "login"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["success"], json!(false));
    assert_eq!(outcome["status_code"], json!(-1));
    assert_eq!(outcome["label"], json!("error"));
}

#[test]
fn test_table_failures_keep_stdout_empty() {
    let output = connected("http://127.0.0.1:1").arg("login").output().unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(output.stdout.is_empty());
}

// ── Against a mocked IEM ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_prints_token() {
    let server = mock_iem().await;

    let mut cmd = connected(&server.uri());
    cmd.arg("login");
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "tok123");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_json_renders_outcome() {
    let server = mock_iem().await;

    let mut cmd = connected(&server.uri());
    cmd.args(["-o", "json-compact", "login"]);
    let output = run(cmd).await;

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        outcome,
        json!({"success": true, "status_code": 200, "label": "bearertoken", "payload": "tok123"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"errors": [{"message": "bad creds"}]})),
        )
        .mount(&server)
        .await;

    let mut cmd = connected(&server.uri());
    cmd.arg("login");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("bad creds"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_prints_flat_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"errors": [{"message": "bad creds"}]})),
        )
        .mount(&server)
        .await;

    let mut cmd = connected(&server.uri());
    cmd.args(["-o", "json-compact", "login"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        outcome,
        json!({"success": false, "status_code": 401, "label": "Error Message", "payload": "bad creds"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pipeline_aborts_after_first_failure() {
    let server = mock_iem().await;
    mount_deploy(&server, "d-1", 1).await;
    mount_deploy(&server, "d-3", 0).await;

    let mut cmd = connected(&server.uri());
    cmd.env("APP_ID", "app-1").args([
        "-o",
        "json",
        "pipeline",
        "--devices",
        "edge-01, edge-02, edge-03",
        "--app-version-id",
        "v-9",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(statuses(&output.stdout), vec!["deployed", "failed", "skipped"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pipeline_continue_attempts_every_device() {
    let server = mock_iem().await;
    mount_deploy(&server, "d-1", 1).await;
    mount_deploy(&server, "d-3", 1).await;

    let mut cmd = connected(&server.uri());
    cmd.args([
        "-o",
        "json",
        "pipeline",
        "--devices",
        "edge-01,edge-02,edge-03",
        "--app-id",
        "app-1",
        "--app-version-id",
        "v-9",
        "--on-failure",
        "continue",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(statuses(&output.stdout), vec!["deployed", "failed", "deployed"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_standalone_reads_device_from_env() {
    let server = mock_iem().await;
    mount_deploy(&server, "d-3", 1).await;

    let mut cmd = connected(&server.uri());
    cmd.env("IED_NAME", "edge-03")
        .env("APP_ID", "app-1")
        .args(["-o", "json", "standalone", "--app-version-id", "v-9"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(statuses(&output.stdout), vec!["deployed"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_numeric_device_name_from_env_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/api/v1/login/direct"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"access_token": "tok123"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/portal/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"deviceId": "d-7", "deviceName": "7"},
            {"deviceId": "d-007", "deviceName": "007"}
        ]})))
        .mount(&server)
        .await;
    mount_deploy(&server, "d-007", 1).await;

    let mut cmd = connected(&server.uri());
    cmd.env("IED_NAME", "007")
        .env("APP_ID", "app-1")
        .args(["-o", "json", "standalone", "--app-version-id", "v-9"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["device"], json!("007"));
    assert_eq!(report[0]["device_id"], json!("d-007"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_standalone_title_miss_is_reported_per_device() {
    let server = mock_iem().await;
    Mock::given(method("GET"))
        .and(path("/portal/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let mut cmd = connected(&server.uri());
    cmd.args([
        "-o",
        "json",
        "standalone",
        "--devices",
        "edge-01",
        "--app-name",
        "Ghost",
        "--app-version-id",
        "v-9",
    ]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["status"], json!("failed"));
    assert_eq!(report[0]["stage"], json!("Authenticated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_id_plain() {
    let server = mock_iem().await;

    let mut cmd = connected(&server.uri());
    cmd.args(["-o", "plain", "devices", "id", "edge-03"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "d-3");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_device_is_not_found() {
    let server = mock_iem().await;

    let mut cmd = connected(&server.uri());
    cmd.args(["devices", "id", "edge-99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("edge-99"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_categories_need_no_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p.service/api/v4/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"categoryId": "c-1", "name": "Analytics"}
        ]})))
        .mount(&server)
        .await;

    let mut cmd = connected(&server.uri());
    cmd.args(["-o", "plain", "categories", "id", "Analytics"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "c-1");
}
