//! Command-line tests for the focuslock binary.
//!
//! Only paths that fail before a session locks anything are exercised here:
//! help, completions and start errors, which must exit with code 1.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Runs focuslock with an empty config path and cues disabled.
fn focuslock(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("focuslock").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("config.json"))
        .arg("--no-sound")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help and completions
// ============================================================================

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("focuslock")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pdf"))
        .stdout(predicate::str::contains("--pomodoro"))
        .stdout(predicate::str::contains("--duration"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("focuslock")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("focuslock"));
}

// ============================================================================
// Start errors
// ============================================================================

#[test]
fn test_missing_pdf_exits_with_error() {
    let dir = TempDir::new().unwrap();
    focuslock(&dir)
        .arg("--pdf")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PDF not found"));
}

#[test]
fn test_unsupported_duration_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("notes.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();

    focuslock(&dir)
        .arg("--pdf")
        .arg(&pdf)
        .args(["--pomodoro", "--duration", "25"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a supported pomodoro duration"))
        .stderr(predicate::str::contains("hint"));
}

#[test]
fn test_malformed_config_exits_with_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ nope").unwrap();

    focuslock(&dir)
        .args(["--pdf", "notes.pdf"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn test_interactive_mode_exits_on_end_of_input() {
    let dir = TempDir::new().unwrap();
    focuslock(&dir).write_stdin("").assert().success();
}

#[test]
fn test_interactive_mode_reports_empty_pdf() {
    let dir = TempDir::new().unwrap();
    focuslock(&dir)
        .write_stdin("\n1\n25\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("no PDF selected"));
}
