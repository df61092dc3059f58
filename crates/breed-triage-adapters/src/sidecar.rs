//! Offline backend reading pre-computed model output from JSON sidecars.
//!
//! For `photos/rex.jpg` the sidecar is `photos/rex.json`:
//!
//! ```json
//! {"features": {"muzzle-head-ratio": 0.6, "...": 0.5}, "judgment": "AmStaff"}
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Context, Result};
use breed_triage_core::{FeatureExtractor, ImageInfo, JudgmentSource, RawFeatures};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Members stay untyped so a bad `features` value cannot spoil the judgment.
#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    #[serde(default)]
    features: Value,
    #[serde(default)]
    judgment: Value,
}

/// Feature extractor and judge answering from `<image stem>.json` files.
///
/// The two lookups for one image share a single read: the first caller
/// parses the sidecar and parks it, the second takes it back out. Only the
/// most recent image is held.
#[derive(Debug, Default)]
pub struct SidecarBackend {
    parked: Mutex<Option<(PathBuf, Arc<Sidecar>)>>,
}

impl SidecarBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parked: Mutex::new(None),
        }
    }

    /// Sidecar path for an image path.
    #[must_use]
    pub fn sidecar_path(image: &Path) -> PathBuf {
        image.with_extension("json")
    }

    fn sidecar(&self, path: &Path) -> Result<Arc<Sidecar>> {
        let mut parked = self.parked.lock().unwrap_or_else(PoisonError::into_inner);
        let handed_over = parked.take_if(|(parked_path, _)| parked_path.as_path() == path);
        if let Some((_, sidecar)) = handed_over {
            return Ok(sidecar);
        }

        let sidecar = Arc::new(Self::read(path)?);
        *parked = Some((path.to_path_buf(), Arc::clone(&sidecar)));
        Ok(sidecar)
    }

    fn read(path: &Path) -> Result<Sidecar> {
        debug!("Reading sidecar {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sidecar: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse sidecar: {}", path.display()))
    }
}

impl FeatureExtractor for SidecarBackend {
    fn extract(&self, image: &ImageInfo) -> Result<Option<RawFeatures>> {
        let path = Self::sidecar_path(Path::new(&image.path));
        match &self.sidecar(&path)?.features {
            Value::Null => Ok(None),
            Value::Object(features) => Ok(Some(features.clone())),
            _ => bail!("Sidecar features must be a JSON object: {}", path.display()),
        }
    }
}

impl JudgmentSource for SidecarBackend {
    fn judge(&self, image: &ImageInfo) -> Result<String> {
        let path = Self::sidecar_path(Path::new(&image.path));
        match &self.sidecar(&path)?.judgment {
            Value::String(text) => Ok(text.clone()),
            Value::Null => bail!("Sidecar has no judgment: {}", path.display()),
            _ => bail!("Sidecar judgment must be a string: {}", path.display()),
        }
    }
}
