//! Breed Triage Adapters - External adapters for breed-triage.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Ollama vision-language models as feature extractor and judge
//! - Offline JSON sidecars as feature extractor and judge

pub mod fs;
pub mod ollama;
pub mod sidecar;

pub use fs::FsImageSource;
pub use ollama::{OllamaBackend, OllamaConfig};
pub use sidecar::SidecarBackend;
