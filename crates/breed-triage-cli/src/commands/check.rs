//! Check command - triage images against the regulated breeds.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use breed_triage_adapters::ollama::{self, OllamaBackend, OllamaConfig};
use breed_triage_adapters::{FsImageSource, SidecarBackend};
use breed_triage_core::{
    FeatureExtractor, ImageSource, JudgmentSource, ProgressEvent, ProgressSink, ResultOutput,
    TriageEngine, TriageRecord, TrustToggles,
};
use clap::{Args, ValueEnum};
use tracing::{debug, info};

use super::{build_engine, parse_trust, trust_toggles, ExitCode};
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Where features and judgments come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Vision-language models on an Ollama server
    #[default]
    Ollama,
    /// Pre-computed `<image>.json` files next to each image
    Sidecar,
}

/// Shared arguments for image triage.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to triage
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Feature and judgment backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Trust in the eye colour seen in the photo (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub eye_trust: Option<f64>,

    /// Trust in the nose colour seen in the photo (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub nose_trust: Option<f64>,

    /// Trust in the body shape when the dog wears clothing (0.0-1.0)
    #[arg(long, value_parser = parse_trust)]
    pub clothing_trust: Option<f64>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Ollama server URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub ollama_url: Option<String>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.backend.is_none() {
            args.backend = config.backend.kind.as_deref().and_then(|s| match s {
                "ollama" => Some(BackendKind::Ollama),
                "sidecar" => Some(BackendKind::Sidecar),
                _ => None,
            });
        }

        if args.format.is_none() {
            args.format = config.output.format.as_deref().and_then(|s| match s {
                "json" => Some(OutputFormat::Json),
                "jsonl" => Some(OutputFormat::Jsonl),
                _ => None,
            });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.ollama_url.is_none() {
            args.ollama_url.clone_from(&config.ollama.url);
        }

        // Trust, Ollama models and synonyms are read from here at run time.
        args.config = Some(config.clone());

        args
    }

    fn config(&self) -> AppConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Trust toggles with config and full-trust fallback.
    fn toggles(&self) -> TrustToggles {
        trust_toggles(
            self.eye_trust,
            self.nose_trust,
            self.clothing_trust,
            &self.config(),
        )
    }

    /// Get backend with fallback to Ollama.
    fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    fn ollama_config(&self) -> OllamaConfig {
        let section = self.config().ollama;
        OllamaConfig {
            base_url: self
                .ollama_url
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_string()),
            feature_model: section
                .feature_model
                .unwrap_or_else(|| ollama::DEFAULT_FEATURE_MODEL.to_string()),
            judgment_model: section
                .judgment_model
                .unwrap_or_else(|| ollama::DEFAULT_JUDGMENT_MODEL.to_string()),
            timeout: Duration::from_secs(
                section.timeout_secs.unwrap_or(ollama::DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of images triaged.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Number of images whose final status is regulated.
    pub regulated: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Feature extractor and judge chosen for a run.
enum Backend {
    Ollama(OllamaBackend),
    Sidecar(SidecarBackend),
}

impl Backend {
    fn build(args: &CheckArgs) -> Result<Self> {
        Ok(match args.backend() {
            BackendKind::Ollama => {
                let config = args.ollama_config();
                info!(
                    "Using Ollama at {} ({} / {})",
                    config.base_url, config.feature_model, config.judgment_model
                );
                Self::Ollama(OllamaBackend::new(config)?)
            }
            BackendKind::Sidecar => {
                info!("Using JSON sidecar files");
                Self::Sidecar(SidecarBackend::new())
            }
        })
    }

    fn extractor(&self) -> &dyn FeatureExtractor {
        match self {
            Self::Ollama(backend) => backend,
            Self::Sidecar(backend) => backend,
        }
    }

    fn judge(&self) -> &dyn JudgmentSource {
        match self {
            Self::Ollama(backend) => backend,
            Self::Sidecar(backend) => backend,
        }
    }
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
///
/// # Errors
///
/// Returns an error if no paths are given, the backend cannot be set up, or
/// output cannot be written.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let engine = build_engine(&args.config());
    let backend = Backend::build(args)?;
    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);
    let output = JsonOutput::stdout();

    let toggles = args.toggles();
    debug!("Trust toggles: {toggles:?}");

    let stages = Stages {
        engine: &engine,
        extractor: backend.extractor(),
        judge: backend.judge(),
        toggles,
    };
    process_images(&source, &stages, &output, &progress_bar, args.format(), args.pretty)
}

/// Everything needed to turn an image into a record.
struct Stages<'a> {
    engine: &'a TriageEngine,
    extractor: &'a dyn FeatureExtractor,
    judge: &'a dyn JudgmentSource,
    toggles: TrustToggles,
}

/// Triage every image from `source` and emit one record per image.
fn process_images(
    source: &dyn ImageSource,
    stages: &Stages<'_>,
    output: &JsonOutput,
    progress: &dyn ProgressSink,
    format: OutputFormat,
    pretty: bool,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut regulated = 0usize;
    let mut all_records: Vec<TriageRecord> = Vec::new();

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // The error message carries the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        let record = stages
            .engine
            .triage(&image, stages.extractor, stages.judge, stages.toggles)
            .into_record(&image, iso_timestamp());

        if record.decision.is_regulated() {
            regulated += 1;
        }

        progress.on_event(ProgressEvent::Completed {
            record: Box::new(record.clone()),
        });

        match format {
            OutputFormat::Jsonl => output.write(&record)?,
            OutputFormat::Json => all_records.push(record),
        }

        processed += 1;
    }

    if format == OutputFormat::Json {
        output.write_array(&all_records, pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed,
        skipped,
        regulated,
    });

    Ok(CheckResult {
        processed,
        skipped,
        regulated,
        exit_code: ExitCode::from_regulated(regulated),
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
