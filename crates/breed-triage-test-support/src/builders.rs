//! Feature, image and fixture builders for testing.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use breed_triage_core::{BreedRegistry, FeatureKey, FeatureVector, ImageDimensions, ImageInfo, RawFeatures};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Builder for feature vectors and their raw wire form.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder {
    vector: FeatureVector,
}

impl FeatureBuilder {
    /// Starts from every feature set to `value`.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            vector: FeatureVector::splat(value),
        }
    }

    /// Starts from the built-in ideal vector of `breed`.
    ///
    /// Unknown breeds start from 0.5 everywhere.
    #[must_use]
    pub fn ideal(breed: &str) -> Self {
        let vector = BreedRegistry::builtin()
            .ideal(breed)
            .copied()
            .unwrap_or_else(|| FeatureVector::splat(0.5));
        Self { vector }
    }

    /// Sets one feature.
    #[must_use]
    pub fn set(mut self, key: FeatureKey, value: f64) -> Self {
        self.vector = self.vector.with(key, value);
        self
    }

    /// The validated vector.
    #[must_use]
    pub const fn build(self) -> FeatureVector {
        self.vector
    }

    /// The raw mapping an extractor would return.
    #[must_use]
    pub fn raw(self) -> RawFeatures {
        self.vector.to_raw()
    }

    /// The raw mapping as a JSON value.
    #[must_use]
    pub fn json(self) -> serde_json::Value {
        serde_json::Value::Object(self.raw())
    }
}

/// Builder for in-memory test images.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// A PNG-encoded image of the given size, filled with a fawn coat colour.
    #[must_use]
    pub fn png(path: &str, width: u32, height: u32) -> ImageInfo {
        let bytes = encode_png(width, height);
        ImageInfo::new(path, bytes).with_dimensions(ImageDimensions::new(width, height))
    }

    /// An image whose bytes are not a decodable format.
    #[must_use]
    pub fn undecodable(path: &str) -> ImageInfo {
        ImageInfo::new(path, b"not an image".to_vec())
    }
}

/// Writes files that the filesystem and sidecar adapters read.
pub struct FixtureWriter;

impl FixtureWriter {
    /// Writes a small PNG into `dir` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn png(dir: &Path, name: &str, width: u32, height: u32) -> Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, encode_png(width, height))
            .with_context(|| format!("Failed to write fixture: {}", path.display()))?;
        Ok(path)
    }

    /// Writes the JSON sidecar for `image`.
    ///
    /// Absent members are left out of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn sidecar(
        image: &Path,
        features: Option<&RawFeatures>,
        judgment: Option<&str>,
    ) -> Result<PathBuf> {
        let mut document = serde_json::Map::new();
        if let Some(features) = features {
            document.insert("features".into(), serde_json::Value::Object(features.clone()));
        }
        if let Some(judgment) = judgment {
            document.insert("judgment".into(), judgment.into());
        }
        let path = image.with_extension("json");
        std::fs::write(&path, serde_json::Value::Object(document).to_string())
            .with_context(|| format!("Failed to write sidecar: {}", path.display()))?;
        Ok(path)
    }

    /// Writes a PNG and its sidecar in one go.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn dog(
        dir: &Path,
        name: &str,
        features: Option<&RawFeatures>,
        judgment: Option<&str>,
    ) -> Result<PathBuf> {
        let image = Self::png(dir, name, 16, 12)?;
        Self::sidecar(&image, features, judgment)?;
        Ok(image)
    }
}

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([193, 154, 107]));
    let mut bytes = Cursor::new(Vec::new());
    // Encoding an in-memory RGB buffer as PNG does not fail.
    let _ = DynamicImage::ImageRgb8(img).write_to(&mut bytes, ImageFormat::Png);
    bytes.into_inner()
}
