//! Feature extractor port.

use crate::domain::{ImageInfo, RawFeatures};

/// Produces the raw morphology feature mapping for an image.
pub trait FeatureExtractor: Send + Sync {
    /// Extracts features from `image`.
    ///
    /// `Ok(None)` means the extractor ran but had nothing to report.
    ///
    /// # Errors
    ///
    /// Returns an error if the extractor could not be reached or its reply
    /// could not be read.
    fn extract(&self, image: &ImageInfo) -> anyhow::Result<Option<RawFeatures>>;
}
