//! Per-image inputs and outputs of the triage pipeline.

use serde::{Deserialize, Serialize};

use super::{ArbitrationDecision, ClassificationResult, PreliminaryJudgment};

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new image dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An image handed to the collaborators.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file.
    pub path: String,
    /// Dimensions, when the header could be decoded.
    pub dimensions: Option<ImageDimensions>,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl ImageInfo {
    /// Creates image info without dimensions.
    #[must_use]
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            dimensions: None,
            bytes,
        }
    }

    /// Sets the dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: ImageDimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Complete triage result for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    /// Path to the image.
    pub path: String,
    /// Timestamp of analysis (RFC 3339).
    pub timestamp: String,
    /// Image dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    /// Categorized preliminary judgment.
    pub judgment: PreliminaryJudgment,
    /// Classifier verdict.
    pub classification: ClassificationResult,
    /// Final decision.
    pub decision: ArbitrationDecision,
}
