//! Categorical judge port.

use crate::domain::ImageInfo;

/// Produces a free-text breed judgment for an image.
pub trait JudgmentSource: Send + Sync {
    /// Returns the judge's answer as plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if no judgment could be obtained.
    fn judge(&self, image: &ImageInfo) -> anyhow::Result<String>;
}
