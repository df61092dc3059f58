//! Configuration file support for breed-triage.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/breed-triage/config.toml` (lowest priority)
//! - Project-local: `.breed-triage.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use breed_triage_core::TrustToggles;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Name of the project-local config file.
pub const PROJECT_CONFIG_NAME: &str = ".breed-triage.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Default trust toggles.
    pub trust: TrustConfig,
    /// Backend selection.
    pub backend: BackendConfig,
    /// Ollama connection settings.
    pub ollama: OllamaSection,
    /// Output formatting settings.
    pub output: OutputConfig,
    /// Extra judgment synonyms.
    pub vocabulary: VocabularyConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Trust toggle defaults (0.0-1.0 each).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Eye-colour trust.
    pub eye: Option<f64>,
    /// Nose-colour trust.
    pub nose: Option<f64>,
    /// Body-shape trust for dogs wearing clothing.
    pub clothing: Option<f64>,
}

/// Backend selection.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend kind: "ollama" or "sidecar".
    pub kind: Option<String>,
}

/// Ollama connection settings.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSection {
    /// Server base URL.
    pub url: Option<String>,
    /// Model used for feature scores.
    pub feature_model: Option<String>,
    /// Model used for the breed judgment.
    pub judgment_model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

/// Judgment vocabulary additions.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Synonym to registry breed name.
    pub synonyms: BTreeMap<String, String>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and dropped.
    pub fn load() -> Self {
        let cwd = std::env::current_dir().ok();
        Self::load_from(xdg_config_path().as_deref(), cwd.as_deref())
    }

    /// Load configuration from an explicit XDG path and search start.
    pub fn load_from(xdg_path: Option<&Path>, start_dir: Option<&Path>) -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_path {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = start_dir.and_then(find_config_in_parents) {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Drops values outside their accepted range and describes each one.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        for (name, value) in [
            ("eye", &mut self.trust.eye),
            ("nose", &mut self.trust.nose),
            ("clothing", &mut self.trust.clothing),
        ] {
            if let Some(Err(e)) = value.map(|v| TrustToggles::check(name, v)) {
                problems.push(format!("trust.{e}"));
                *value = None;
            }
        }

        if let Some(kind) = &self.backend.kind {
            if kind != "ollama" && kind != "sidecar" {
                problems.push(format!(
                    "backend.kind must be 'ollama' or 'sidecar', got '{kind}'"
                ));
                self.backend.kind = None;
            }
        }

        if self.ollama.timeout_secs == Some(0) {
            problems.push("ollama.timeout_secs must be positive".to_string());
            self.ollama.timeout_secs = None;
        }

        if let Some(format) = &self.output.format {
            if format != "json" && format != "jsonl" {
                problems.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{format}'"
                ));
                self.output.format = None;
            }
        }

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.trust.eye = other.trust.eye.or(self.trust.eye);
        self.trust.nose = other.trust.nose.or(self.trust.nose);
        self.trust.clothing = other.trust.clothing.or(self.trust.clothing);

        self.backend.kind = other.backend.kind.or_else(|| self.backend.kind.take());

        self.ollama.url = other.ollama.url.or_else(|| self.ollama.url.take());
        self.ollama.feature_model = other
            .ollama
            .feature_model
            .or_else(|| self.ollama.feature_model.take());
        self.ollama.judgment_model = other
            .ollama
            .judgment_model
            .or_else(|| self.ollama.judgment_model.take());
        self.ollama.timeout_secs = other.ollama.timeout_secs.or(self.ollama.timeout_secs);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);

        // Project synonyms add to XDG ones; the same synonym is replaced.
        self.vocabulary.synonyms.extend(other.vocabulary.synonyms);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("breed-triage").join("config.toml"))
}

/// Search for the project config in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_NAME))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {e}", path.display());
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("warning: failed to parse config file {}: {e}", path.display());
            None
        }
    }
}
