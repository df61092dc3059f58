//! CLI command definitions and handlers.

pub mod check;
pub mod classify;
pub mod profiles;

use breed_triage_core::{BreedRegistry, TriageEngine, TrustToggles, Vocabulary};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Breed Triage - Regulated bully-breed triage for dog photographs
#[derive(Parser)]
#[command(name = "breed-triage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, trust toggles, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Triage images against the regulated breeds
    Check(check::CheckArgs),
    /// Classify a single feature vector read from a file or stdin
    Classify(classify::ClassifyArgs),
    /// Print the breed profiles and their synonyms
    Profiles(profiles::ProfilesArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// No image was finally regulated.
    Success = 0,
    /// At least one image was finally regulated.
    RegulatedFound = 1,
    /// The command could not run.
    Error = 2,
}

impl ExitCode {
    /// Exit code for a run that found `regulated` regulated images.
    #[must_use]
    pub const fn from_regulated(regulated: usize) -> Self {
        if regulated > 0 {
            Self::RegulatedFound
        } else {
            Self::Success
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Parse and validate a trust value (0.0-1.0).
fn parse_trust(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    TrustToggles::check("trust", value).map_err(|_| format!("{value} is not in 0.0..=1.0"))
}

/// Trust toggles as CLI overrides over config over full trust.
fn trust_toggles(
    eye: Option<f64>,
    nose: Option<f64>,
    clothing: Option<f64>,
    config: &AppConfig,
) -> TrustToggles {
    let full = TrustToggles::FULL;
    TrustToggles::new(
        eye.or(config.trust.eye).unwrap_or(full.eye_trust),
        nose.or(config.trust.nose).unwrap_or(full.nose_trust),
        clothing.or(config.trust.clothing).unwrap_or(full.clothing_trust),
    )
}

/// Builds the engine, adding configured synonyms to the built-in vocabulary.
///
/// Invalid synonyms are reported and the built-in vocabulary is kept.
fn build_engine(config: &AppConfig) -> TriageEngine {
    let registry = BreedRegistry::builtin();
    let mut vocabulary = Vocabulary::builtin();
    if let Err(e) = vocabulary.extend(&registry, &config.vocabulary.synonyms) {
        eprintln!("warning: ignoring [vocabulary] synonyms: {e}");
    }
    TriageEngine::new(registry, vocabulary)
}
