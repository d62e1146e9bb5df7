#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the nuages-server binary.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PROXMOX_VARS: [&str; 4] = [
    "PROXMOX_HOST",
    "PROXMOX_USER",
    "PROXMOX_TOKEN_NAME",
    "PROXMOX_TOKEN_VALUE",
];

fn nuages_server() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nuages-server"));
    for var in PROXMOX_VARS {
        cmd.env_remove(var);
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd
}

fn run(args: &[&str]) -> Output {
    nuages_server()
        .args(args)
        .output()
        .expect("Failed to execute nuages-server")
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("config.yaml");
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

const VALID_CONFIG: &str = r#"
server:
  bind_addr: 127.0.0.1:0
database:
  url: "sqlite::memory:"
nuages:
  proxmox:
    host: pve.example.org
    user: root@pam
    token_name: nuages
    token_value: very-secret-value
"#;

#[test]
fn test_cli_help_command() {
    let output = run(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--mock"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run(&["frobnicate"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run(&["--config", "/definitely/not/here.yaml", "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file does not exist"));
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "server: [unclosed\n");
    let output = run(&["--config", &path, "check"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_check_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), VALID_CONFIG);
    let output = run(&["--config", &path, "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Configuration is valid"));
    assert!(!stdout.contains("very-secret-value"));
}

#[test]
fn test_cli_check_reports_missing_credential() {
    let output = run(&["check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PROXMOX_HOST"));
}

#[test]
fn test_cli_credentials_from_environment() {
    let output = nuages_server()
        .env("PROXMOX_HOST", "pve")
        .env("PROXMOX_USER", "root@pam")
        .env("PROXMOX_TOKEN_NAME", "nuages")
        .env("PROXMOX_TOKEN_VALUE", "env-secret")
        .arg("check")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("env-secret"));
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), VALID_CONFIG);
    let output = run(&["--config", &path, "--port", "9123", "--mock", "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("9123"));
    assert!(stdout.contains("sqlite::memory:"));
    assert!(stdout.contains("***"));
    assert!(!stdout.contains("very-secret-value"));
}

#[test]
fn test_cli_run_refuses_incomplete_credentials() {
    let output = run(&["--mock", "run"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PROXMOX_HOST"));
}
