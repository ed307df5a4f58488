//! Integration tests for the `promokit` CLI binary.
//!
//! Argument parsing, help, completions and error exit codes run without any
//! collaborator. The rest point `--source` at a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `promokit` binary with env isolation.
///
/// Clears all `PROMOKIT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn promokit_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("promokit");
    cmd.env("HOME", "/tmp/promokit-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/promokit-cli-test-nonexistent")
        .env_remove("PROMOKIT_PROFILE")
        .env_remove("PROMOKIT_SOURCE")
        .env_remove("PROMOKIT_REDEEM_URL")
        .env_remove("PROMOKIT_API_KEY")
        .env_remove("PROMOKIT_OUTPUT")
        .env_remove("PROMOKIT_INSECURE")
        .env_remove("PROMOKIT_TIMEOUT")
        .env_remove("PROMOKIT_DEFAULT_PROFILE");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn codes_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "codes": [
                { "id": 1, "code": "A1", "description": "Free dessert", "value": "$5",
                  "status": "active" },
                { "id": 2, "code": "B2", "description": "Free coffee", "value": "$3",
                  "status": "redeemed", "redemptionDate": "2024-01-01", "customer": "Ada" }
            ],
            "source": "sheet"
        })))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = promokit_cmd();
    cmd.args(["--source", &format!("{}/exec", server.uri()), "--timeout", "5"])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = promokit_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    promokit_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("promotional codes")
            .and(predicate::str::contains("codes"))
            .and(predicate::str::contains("redeem")),
    );
}

#[test]
fn test_version_flag() {
    promokit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("promokit"));
}

#[test]
fn test_completions_zsh() {
    promokit_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases without a collaborator ──────────────────────────────

#[test]
fn test_codes_list_without_source() {
    promokit_cmd()
        .args(["codes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No code source configured"));
}

#[test]
fn test_unknown_profile() {
    let output = promokit_cmd()
        .args(["--profile", "shop", "codes", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("Profile 'shop' not found"));
}

#[test]
fn test_invalid_status_filter() {
    let output = promokit_cmd()
        .args(["codes", "list", "--status", "expired"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_show_no_config() {
    promokit_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_unreachable_source_is_connection_error() {
    let output = promokit_cmd()
        .args(["--source", "http://127.0.0.1:9/exec", "--timeout", "2"])
        .args(["codes", "list"])
        .output()
        .unwrap();
    let code = output.status.code();
    assert!(matches!(code, Some(7 | 8)), "exit code {code:?}");
}

// ── Against a mock collaborator ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_codes_list_table() {
    let server = codes_server().await;

    let output = run(&server, &["codes", "list"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Free dessert"));
    assert!(stdout.contains("2024-01-01"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_codes_list_json_filters_by_status() {
    let server = codes_server().await;

    let output = run(&server, &["-o", "json", "codes", "list", "--status", "active"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let codes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(codes.as_array().unwrap().len(), 1);
    assert_eq!(codes[0]["code"], "A1");
    assert_eq!(codes[0]["status"], "active");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_codes_list_search_plain() {
    let server = codes_server().await;

    let output = run(&server, &["-o", "plain", "codes", "list", "--search", "ada"]).await;

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "B2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_source_exits_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "codes": [], "source": "sheet" }))
                .set_delay(std::time::Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut cmd = promokit_cmd();
    cmd.args(["--source", &format!("{}/exec", server.uri()), "--timeout", "1"])
        .args(["codes", "list"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(8), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("timed out"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_source_error_mentioning_timeout_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Spreadsheet read timed out",
            "source": "error"
        })))
        .mount(&server)
        .await;

    let output = run(&server, &["codes", "list"]).await;

    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_codes_get_unknown_exits_not_found() {
    let server = codes_server().await;

    let output = run(&server, &["codes", "get", "NOPE"]).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("'NOPE' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_posts_canonical_code() {
    let server = codes_server().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "code": "A1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["--yes", "-o", "plain", "redeem", " a1 "]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "A1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_already_redeemed_skips_sink() {
    let server = codes_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(&server, &["--yes", "redeem", "b2"]).await;

    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("already redeemed on 2024-01-01"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_rejection_exits_rejected() {
    let server = codes_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Code expired"
        })))
        .mount(&server)
        .await;

    let output = run(&server, &["--yes", "redeem", "A1"]).await;

    assert_eq!(output.status.code(), Some(9));
    assert!(combined_output(&output).contains("Code expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redeem_without_yes_needs_terminal() {
    let server = codes_server().await;

    let output = run(&server, &["redeem", "A1"]).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}
