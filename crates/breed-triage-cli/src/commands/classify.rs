//! Classify command - run the classifier and arbiter on one feature vector.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use breed_triage_core::{
    ArbitrationDecision, ClassificationResult, ClassificationStatus, RawFeatures,
};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{build_engine, parse_trust, trust_toggles, ExitCode};
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for the classify command.
#[derive(Args, Clone)]
pub struct ClassifyArgs {
    /// JSON file holding the feature object, or `-` for stdin
    #[arg(long, value_name = "FILE")]
    pub features: PathBuf,

    /// Preliminary judgment text; when given, the arbiter also runs
    #[arg(long, value_name = "TEXT")]
    pub judgment: Option<String>,

    /// Trust in the eye colour seen in the photo (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub eye_trust: Option<f64>,

    /// Trust in the nose colour seen in the photo (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub nose_trust: Option<f64>,

    /// Trust in the body shape when the dog wears clothing (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub clothing_trust: Option<f64>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Serialize)]
struct ClassifyReport {
    classification: ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<ArbitrationDecision>,
}

impl ClassifyReport {
    fn final_status(&self) -> ClassificationStatus {
        self.decision
            .as_ref()
            .map_or(self.classification.status, |d| d.final_status)
    }
}

/// Run the classify command.
///
/// # Errors
///
/// Returns an error if the features cannot be read, are not a JSON object, or
/// output cannot be written.
pub fn run(args: &ClassifyArgs, config: &AppConfig) -> Result<ExitCode> {
    let features = read_features(&args.features)?;
    let engine = build_engine(config);
    let toggles = trust_toggles(args.eye_trust, args.nose_trust, args.clothing_trust, config);

    let report = match &args.judgment {
        Some(text) => {
            let outcome = engine.evaluate(Some(&features), text, toggles);
            ClassifyReport {
                classification: outcome.classification,
                decision: Some(outcome.decision),
            }
        }
        None => ClassifyReport {
            classification: engine.classifier().classify(Some(&features), toggles),
            decision: None,
        },
    };
    info!("Final status: {}", report.final_status());

    let output = JsonOutput::stdout();
    output.write_document(&report, args.pretty)?;

    Ok(ExitCode::from_regulated(usize::from(
        report.final_status() == ClassificationStatus::Regulated,
    )))
}

fn read_features(path: &Path) -> Result<RawFeatures> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read features from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read features: {}", path.display()))?
    };
    parse_features(&text).with_context(|| format!("Invalid features in {}", path.display()))
}

fn parse_features(text: &str) -> Result<RawFeatures> {
    match serde_json::from_str(text)? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, found {}", kind_of(&other)),
    }
}

const fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
