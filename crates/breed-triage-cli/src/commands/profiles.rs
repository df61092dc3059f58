//! Profiles command - print the breed registry.

use anyhow::Result;
use breed_triage_core::BreedProfile;
use clap::Args;
use serde::Serialize;

use super::build_engine;
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for the profiles command.
#[derive(Args, Clone)]
pub struct ProfilesArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Serialize)]
struct ProfileEntry<'a> {
    #[serde(flatten)]
    profile: &'a BreedProfile,
    synonyms: Vec<&'a str>,
}

/// Run the profiles command.
///
/// Synonyms include those added by the `[vocabulary]` config section.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn run(args: &ProfilesArgs, config: &AppConfig) -> Result<()> {
    let engine = build_engine(config);
    let vocabulary = engine.vocabulary();

    let entries: Vec<ProfileEntry<'_>> = engine
        .registry()
        .profiles()
        .iter()
        .map(|profile| ProfileEntry {
            profile,
            synonyms: vocabulary.synonyms_for(&profile.name).collect(),
        })
        .collect();

    JsonOutput::stdout().write_array(&entries, args.pretty)
}
