//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Command isolated from the user's XDG and project config files.
fn breed_triage(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("breed-triage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("xdg")).current_dir(home);
    cmd
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_check_subcommand_without_paths_fails() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: No paths specified"));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .args(["--backend", "sidecar", "/nonexistent/path/to/dog.jpg"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn test_empty_directory() {
    let home = tempfile::tempdir().unwrap();
    let photos = tempfile::tempdir().unwrap();

    breed_triage(home.path())
        .arg(photos.path())
        .args(["--backend", "sidecar"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

// === Value Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .args(["--format", "xml", "dog.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").and(predicate::str::contains("jsonl")));
}

#[test]
fn test_invalid_backend_rejected() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .args(["--backend", "gpt", "dog.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ollama").and(predicate::str::contains("sidecar")));
}

#[test]
fn test_trust_out_of_range_rejected() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .args(["--eye-trust", "1.5", "dog.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1.5 is not in 0.0..=1.0"));
}

#[test]
fn test_trust_not_a_number_rejected() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .args(["--nose-trust", "high", "dog.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'high' is not a valid number"));
}

#[test]
fn test_valid_trust_accepted() {
    let home = tempfile::tempdir().unwrap();
    let photos = tempfile::tempdir().unwrap();

    breed_triage(home.path())
        .args(["--backend", "sidecar"])
        .args(["--eye-trust", "0", "--nose-trust", "0.5", "--clothing-trust", "1"])
        .arg(photos.path())
        .assert()
        .code(0);
}

// === Help Tests ===

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("check")
                .and(predicate::str::contains("classify"))
                .and(predicate::str::contains("profiles")),
        );
}

#[test]
fn test_classify_requires_features() {
    let home = tempfile::tempdir().unwrap();
    breed_triage(home.path())
        .arg("classify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--features"));
}
