//! Integration tests for the config command

use assert_cmd::cargo;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn set_home_env(cmd: &mut assert_cmd::Command, temp_dir: &TempDir) {
    let workdir = temp_dir.path().join("workdir");
    fs::create_dir_all(&workdir).unwrap();
    cmd.env("CSVM_HOME", temp_dir.path())
        .env_remove("CSVM_SMTP_HOST")
        .env_remove("CSVM_SMTP_PORT")
        .env_remove("CSVM_SMTP_USER")
        .env_remove("CSVM_SMTP_PASSWORD")
        .env_remove("CSVM_SENDER")
        .env_remove("CSVM_TRANSPORT")
        .env_remove("CSVM_OUTBOX_DIR")
        .current_dir(&workdir);
}

fn write_global_config(temp_dir: &TempDir, content: &str) {
    let dir = temp_dir.path().join(".config/csvm");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_config_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("csvm");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("config")
        .assert()
        .success()
        .stdout(contains("smtp.host: smtp.gmail.com"))
        .stdout(contains("smtp.port: 587"))
        .stdout(contains("smtp.security: starttls"))
        .stdout(contains("notify.transport: smtp"))
        .stdout(contains("(not found)"))
        .stdout(contains("Applied: (defaults only)"));
}

#[test]
fn test_config_masks_password() {
    let temp_dir = TempDir::new().unwrap();
    write_global_config(
        &temp_dir,
        "[smtp]\nusername = \"ops@example.com\"\npassword = \"hunter2\"\n",
    );

    let mut cmd = cargo::cargo_bin_cmd!("csvm");
    set_home_env(&mut cmd, &temp_dir);
    cmd.arg("config")
        .assert()
        .success()
        .stdout(contains("smtp.username: ops@example.com"))
        .stdout(contains("sender: ops@example.com"))
        .stdout(contains("hunter2").not())
        .stdout(contains("(found)"));
}

#[test]
fn test_config_json_reflects_env_and_repo_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("workdir")).unwrap();
    fs::write(
        temp_dir.path().join("workdir/.csvm.toml"),
        "[notify]\ntransport = \"file\"\noutbox_dir = \"/tmp/csvm-outbox\"\n",
    )
    .unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("csvm");
    set_home_env(&mut cmd, &temp_dir);
    let output = cmd
        .env("CSVM_SMTP_PORT", "2525")
        .args(["config", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["smtp"]["port"], 2525);
    assert_eq!(json["notify"]["transport"], "file");
    assert_eq!(json["notify"]["outbox_dir"], "/tmp/csvm-outbox");
    assert_eq!(json["configFiles"]["repo"]["exists"], true);
    assert_eq!(json["configFiles"]["global"]["exists"], false);
    let applied = json["appliedFiles"].as_array().unwrap();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].as_str().unwrap().ends_with(".csvm.toml"));
    assert!(json["sender"].is_null());
}

#[test]
fn test_explicit_config_parse_error_fails() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("bad.toml");
    fs::write(&bad, "[smtp\nport = ").unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("csvm");
    set_home_env(&mut cmd, &temp_dir);
    cmd.args(["config", "--config"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("Error: TOML parsing error"));
}
