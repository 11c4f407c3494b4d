//! Integration tests for the lifecycle CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd. None
//! of them reach a real endpoint: apply runs are cut short either by
//! argument errors or by missing credentials in a scrubbed environment.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const ENV_VARS: [&str; 6] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "S3_ENDPOINT",
    "AWS_DEFAULT_REGION",
    "AWS_VERIFY_SSL",
    "S3_CA_BUNDLE",
];

/// Get a Command for the lifecycle binary with store variables scrubbed
fn lifecycle_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lifecycle"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("DEBUG");
    cmd
}

#[test]
fn test_help_output() {
    let mut cmd = lifecycle_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lifecycle Manager"));
}

#[test]
fn test_version_output() {
    let mut cmd = lifecycle_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lifecycle"));
}

#[test]
fn test_no_command_shows_help_hint() {
    let mut cmd = lifecycle_cmd();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lifecycle --help"));
}

#[test]
fn test_selftest_passes() {
    let mut cmd = lifecycle_cmd();
    cmd.arg("test")
        .assert()
        .success()
        .stdout(predicate::str::contains("All self-tests passed"));
}

#[test]
fn test_apply_requires_config_file_argument() {
    let mut cmd = lifecycle_cmd();
    cmd.args(["apply", "my-bucket"]).assert().failure();
}

#[test]
fn test_apply_without_credentials_reports_missing_env() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("lifecycle.json");
    fs::write(&config, r#"{"Rules": []}"#).unwrap();

    let mut cmd = lifecycle_cmd();
    cmd.args(["apply", "my-bucket", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required environment variables"));
}

#[test]
fn test_apply_with_missing_config_file_names_the_path() {
    let mut cmd = lifecycle_cmd();
    cmd.env("S3_ENDPOINT", "https://storage.invalid")
        .env("AWS_ACCESS_KEY_ID", "test-access")
        .env("AWS_SECRET_ACCESS_KEY", "test-secret")
        .args(["apply", "my-bucket", "/nonexistent/lifecycle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/lifecycle.json"));
}

#[test]
fn test_apply_rejects_invalid_bucket_names() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("lifecycle.json");
    fs::write(&config, r#"{"Rules": []}"#).unwrap();

    let mut cmd = lifecycle_cmd();
    cmd.env("S3_ENDPOINT", "https://storage.invalid")
        .env("AWS_ACCESS_KEY_ID", "test-access")
        .env("AWS_SECRET_ACCESS_KEY", "test-secret")
        .args(["apply", "../escape", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bucket name"));
}
