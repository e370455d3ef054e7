// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for xtask subcommands.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)] // cargo_bin works fine; the replacement macro is unstable
fn xtask() -> Command {
    Command::cargo_bin("xtask").unwrap()
}

#[test]
fn schema_subcommand_exists() {
    xtask()
        .args(["schema", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON Schema"));
}

#[test]
fn schema_writes_config_schema() {
    let dir = tempfile::tempdir().unwrap();
    xtask()
        .args(["schema", "--out-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote"));

    let content = std::fs::read_to_string(dir.path().join("gfv-config.schema.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let obj = value.as_object().expect("schema should be a JSON object");
    assert!(obj.contains_key("$schema"));
    assert!(content.contains("popup_max_width"));
    assert!(content.contains("posix_shell"));
}

#[test]
fn schema_check_passes_after_generation() {
    let dir = tempfile::tempdir().unwrap();
    xtask()
        .args(["schema", "--out-dir"])
        .arg(dir.path())
        .assert()
        .success();
    xtask()
        .args(["schema", "--check", "--out-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn schema_check_fails_on_stale_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gfv-config.schema.json"), "{}").unwrap();
    xtask()
        .args(["schema", "--check", "--out-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stale"));
}

#[test]
fn unknown_subcommand_fails() {
    xtask().arg("nope").assert().failure();
}
