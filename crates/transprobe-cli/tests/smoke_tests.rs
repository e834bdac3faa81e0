//! Smoke tests for the transprobe CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the transprobe binary, isolated in `dir`
fn transprobe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("transprobe").expect("transprobe binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("TRANSPROBE_CONFIG")
        .env_remove("TRANSPROBE_URL")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir).assert().failure();
}

#[test]
fn test_run_help() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--headed"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_builtin() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("baseline/Pos_Fun_0001"))
        .stdout(predicate::str::contains("extended/Pos_UI_0002"));
}

#[test]
fn test_list_verbose_shows_waits() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["list", "-v", "--filter", "Pos_UI_0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("baseline/Pos_UI_0001"))
        .stdout(predicate::str::contains("    waits for "))
        .stdout(predicate::str::contains("ms)"));

    transprobe(&dir)
        .args(["list", "--filter", "Pos_UI_0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("waits for").not());
}

#[test]
fn test_list_suite_and_polarity() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["list", "--suite", "baseline", "--polarity", "negative"])
        .assert()
        .success()
        .stdout(predicate::str::contains("baseline/Neg_Fun_0001"))
        .stdout(predicate::str::contains("Pos_Fun").not())
        .stdout(predicate::str::contains("extended/").not());
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    let output = transprobe(&dir)
        .args(["list", "--format", "json", "--filter", "Pos_UI"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "baseline/Pos_UI_0001");
    assert_eq!(entries[0]["flow"], "clear_and_verify");
    assert_eq!(entries[1]["id"], "extended/Pos_UI_0002");
    assert_eq!(entries[1]["flow"], "repeat_after_clear");
}

#[test]
fn test_list_unknown_suite_fails() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["list", "--suite", "nightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown suite"));
}

#[test]
fn test_list_missing_catalog_fails() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["list", "--catalog", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_list_duplicate_catalog_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("dup.yaml"),
        "suites:\n  - name: s\n    scenarios:\n      - id: A\n        input: mama\n        expect:\n          contains: මම\n      - id: A\n        input: oyaa\n        expect:\n          contains: ඔයා\n",
    )
    .unwrap();
    transprobe(&dir)
        .args(["list", "--catalog", "dup.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate scenario: s/A"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_shows_defaults() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: https://www.swifttranslator.com/"));
}

#[test]
fn test_config_init_once() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["config", "--init"])
        .assert()
        .success();
    assert!(dir.path().join("transprobe.yaml").is_file());

    transprobe(&dir)
        .args(["config", "--init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("transprobe.yaml"), "jobs: 7\n").unwrap();
    transprobe(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("jobs: 7"));
}

#[test]
fn test_config_unknown_field_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("transprobe.yaml"), "jbos: 7\n").unwrap();
    transprobe(&dir).arg("config").assert().failure();
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_without_matches_succeeds() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["run", "--filter", "no-such-scenario"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scenarios matched"));
}

#[test]
fn test_run_rejects_bad_url() {
    let dir = TempDir::new().unwrap();
    transprobe(&dir)
        .args(["run", "--url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}
