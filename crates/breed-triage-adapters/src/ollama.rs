//! Vision-language model backend over the Ollama chat API.
//!
//! One model scores the morphology features, a second one names the breed.
//! Both receive the image base64-encoded in a single non-streaming chat turn.

use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use breed_triage_core::{
    breeds, FeatureExtractor, FeatureKey, ImageInfo, JudgmentSource, RawFeatures,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Default model for feature scoring.
pub const DEFAULT_FEATURE_MODEL: &str = "llava";
/// Default model for the breed judgment.
pub const DEFAULT_JUDGMENT_MODEL: &str = "gemma3:27b-it-qat";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection and model settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Server base URL, without the `/api` path.
    pub base_url: String,
    /// Model asked for feature scores.
    pub feature_model: String,
    /// Model asked for the breed judgment.
    pub judgment_model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feature_model: DEFAULT_FEATURE_MODEL.to_string(),
            judgment_model: DEFAULT_JUDGMENT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
    images: [String; 1],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Feature extractor and judge backed by an Ollama server.
pub struct OllamaBackend {
    client: reqwest::blocking::Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    /// Creates a backend with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// The settings in use.
    #[must_use]
    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn chat(&self, model: &str, prompt: &str, image: &ImageInfo) -> Result<String> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
                images: [base64::engine::general_purpose::STANDARD.encode(&image.bytes)],
            }],
            stream: false,
        };

        info!("Asking {model} about {}", image.path);
        let response: ChatResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach Ollama at {url}"))?
            .error_for_status()
            .with_context(|| format!("Ollama rejected the request for model {model}"))?
            .json()
            .with_context(|| format!("Unexpected reply from model {model}"))?;

        debug!("{model} replied: {}", response.message.content);
        Ok(response.message.content)
    }
}

impl FeatureExtractor for OllamaBackend {
    fn extract(&self, image: &ImageInfo) -> Result<Option<RawFeatures>> {
        let reply = self.chat(&self.config.feature_model, &feature_prompt(), image)?;
        parse_features(&reply).map(Some)
    }
}

impl JudgmentSource for OllamaBackend {
    fn judge(&self, image: &ImageInfo) -> Result<String> {
        let reply = self.chat(&self.config.judgment_model, &judgment_prompt(), image)?;
        clean_judgment(&reply)
    }
}

const FEATURE_GUIDE: [(FeatureKey, &str); FeatureKey::COUNT] = [
    (
        FeatureKey::ShoulderHeightNorm,
        "shoulder height; 0.0 very small, 1.0 very tall",
    ),
    (
        FeatureKey::BodyWeightNorm,
        "build and muscle mass; 0.5 lean, 1.0 very heavy and stocky",
    ),
    (
        FeatureKey::MuzzleHeadRatio,
        "muzzle length relative to skull; 0.7 about 2:3 (APBT), 0.5 shorter, 0.3 very short and cube-like",
    ),
    (
        FeatureKey::BlackNoseRequired,
        "nose is definitely black; 1.0 black, 0.0 pink or liver, 0.5 cannot tell",
    ),
    (
        FeatureKey::BlueEyesForbidden,
        "eyes are not blue; 1.0 clearly not blue, 0.0 blue",
    ),
    (
        FeatureKey::ChestWidthDepth,
        "chest width relative to depth; 0.5 no wider than deep, 1.0 very wide",
    ),
    (
        FeatureKey::BodySquareness,
        "side profile; 1.0 square (height equals length), 0.5 slightly longer than tall",
    ),
    (
        FeatureKey::HeadBreadthIndex,
        "skull breadth between the ears; 0.5 moderate, 1.0 very broad",
    ),
];

fn feature_prompt() -> String {
    let mut prompt = String::from(
        "You are a professional dog breed assessor. Score the dog in the image on each \
         feature below with a number from 0.0 (does not match at all) to 1.0 (matches perfectly).\n\n",
    );
    for (key, guide) in FEATURE_GUIDE {
        prompt.push_str(&format!("- {key}: {guide}\n"));
    }
    let example: Vec<String> = FeatureKey::ALL.iter().map(|k| format!("\"{k}\": 0.5")).collect();
    prompt.push_str(&format!(
        "\nReply with a single strict JSON object using exactly these keys and no other text, for example:\n{{{}}}\n",
        example.join(", ")
    ));
    prompt
}

fn judgment_prompt() -> String {
    format!(
        "You are a dog breed identification expert. Going by first impression, which of \
         these categories is the dog in the image closest to?\n\n\
         - {}\n- {}\n- {}\n- {}\n- other breed\n\n\
         Boxers, French Bulldogs, Bulldogs, Dogo Argentinos, Tosas, Neapolitan Mastiffs, \
         Boston Terriers, Golden Retrievers and every breed not listed above are \"other breed\".\n\
         Reply with exactly one category name and nothing else.",
        breeds::APBT,
        breeds::AMSTAFF,
        breeds::SBT,
        breeds::AMERICAN_BULLY,
    )
}

/// Parses a feature reply, tolerating Markdown code fences.
///
/// # Errors
///
/// Returns an error if the reply is not a JSON object.
pub fn parse_features(reply: &str) -> Result<RawFeatures> {
    let body = strip_code_fences(reply);
    let value: serde_json::Value =
        serde_json::from_str(body).context("Feature reply is not valid JSON")?;
    match value {
        serde_json::Value::Object(features) => Ok(features),
        other => anyhow::bail!("Feature reply is not a JSON object: {other}"),
    }
}

/// Normalizes a judgment reply to the bare label.
///
/// # Errors
///
/// Returns an error if nothing is left after cleanup.
pub fn clean_judgment(reply: &str) -> Result<String> {
    let text = reply.replace('"', "");
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Judgment reply is empty");
    }
    Ok(text.to_string())
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
