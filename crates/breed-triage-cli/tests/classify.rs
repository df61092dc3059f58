//! Tests for the `classify` command.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use breed_triage_core::{breeds, FeatureKey};
use breed_triage_test_support::FeatureBuilder;
use predicates::prelude::*;

fn breed_triage(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("breed-triage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("xdg")).current_dir(home);
    cmd
}

fn write_features(dir: &Path, features: &serde_json::Value) -> PathBuf {
    let path = dir.join("features.json");
    std::fs::write(&path, features.to_string()).unwrap();
    path
}

fn report(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_classify_regulated_breed_from_file() {
    let home = tempfile::tempdir().unwrap();
    let path = write_features(home.path(), &FeatureBuilder::ideal(breeds::APBT).json());

    let output = breed_triage(home.path())
        .arg("classify")
        .arg("--features")
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report = report(&output);
    assert_eq!(report["classification"]["breed"], breeds::APBT);
    assert_eq!(report["classification"]["status"], "regulated");
    assert_eq!(report["classification"]["distance"], 0.0);
    assert!(report.get("decision").is_none());
}

#[test]
fn test_classify_from_stdin_with_judgment() {
    let home = tempfile::tempdir().unwrap();
    let features = FeatureBuilder::ideal(breeds::AMSTAFF).json().to_string();

    let output = breed_triage(home.path())
        .args(["classify", "--features", "-", "--judgment", "Labrador"])
        .write_stdin(features)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report = report(&output);
    assert_eq!(report["classification"]["breed"], breeds::AMSTAFF);
    assert_eq!(report["decision"]["final_breed"], "other/non-target");
    assert_eq!(report["decision"]["rationale"], "judge_veto");
    assert!(report["decision"]["note"]
        .as_str()
        .unwrap()
        .starts_with("judge veto"));
}

#[test]
fn test_classify_consistent_judgment_is_regulated() {
    let home = tempfile::tempdir().unwrap();
    let features = FeatureBuilder::ideal(breeds::AMSTAFF).json().to_string();

    breed_triage(home.path())
        .args(["classify", "--features", "-", "--judgment", "amstaff"])
        .write_stdin(features)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"rationale\":\"consistent\""));
}

#[test]
fn test_classify_key_mismatch_reports_status() {
    let home = tempfile::tempdir().unwrap();
    let mut features = FeatureBuilder::ideal(breeds::SBT).raw();
    features.insert("tail-length".into(), 0.4.into());
    let path = write_features(home.path(), &serde_json::Value::Object(features));

    let output = breed_triage(home.path())
        .arg("classify")
        .arg("--features")
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report = report(&output);
    assert_eq!(report["classification"]["breed"], "unknown");
    assert_eq!(
        report["classification"]["status"],
        "classification failed (key mismatch)"
    );
}

#[test]
fn test_classify_trust_flag() {
    let home = tempfile::tempdir().unwrap();
    let features = FeatureBuilder::ideal(breeds::AMSTAFF)
        .set(FeatureKey::BlackNoseRequired, 0.0)
        .json()
        .to_string();

    let trusted = breed_triage(home.path())
        .args(["classify", "--features", "-"])
        .write_stdin(features.clone())
        .output()
        .unwrap();
    let distrusted = breed_triage(home.path())
        .args(["classify", "--features", "-", "--nose-trust", "0"])
        .write_stdin(features)
        .output()
        .unwrap();

    assert_eq!(report(&trusted)["classification"]["breed"], breeds::APBT);
    assert_eq!(report(&distrusted)["classification"]["breed"], breeds::AMSTAFF);
    assert_eq!(report(&distrusted)["classification"]["distance"], 0.0);
}

#[test]
fn test_classify_rejects_non_object() {
    let home = tempfile::tempdir().unwrap();

    breed_triage(home.path())
        .args(["classify", "--features", "-"])
        .write_stdin("[0.5, 0.5]")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected a JSON object, found an array"));
}

#[test]
fn test_classify_missing_file() {
    let home = tempfile::tempdir().unwrap();

    breed_triage(home.path())
        .args(["classify", "--features", "nowhere.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read features"));
}

#[test]
fn test_classify_pretty_output() {
    let home = tempfile::tempdir().unwrap();
    let features = FeatureBuilder::ideal(breeds::SBT).json().to_string();

    breed_triage(home.path())
        .args(["classify", "--features", "-", "--pretty"])
        .write_stdin(features)
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("{\n  \"classification\""));
}
