//! Output of the weighted-distance classifier.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::FeatureError;

/// Label of the synthetic breed produced by open-set rejection.
pub const NON_TARGET_LABEL: &str = "other/non-target";

/// Label used when no classification could be attempted.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Breed assigned by a classification or decision.
///
/// Serialized as a plain string: the breed name, [`NON_TARGET_LABEL`] or
/// [`UNKNOWN_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BreedLabel {
    /// A named registry breed.
    Breed(String),
    /// None of the target breeds.
    NonTarget,
    /// Input was unusable; no breed was considered.
    Unknown,
}

impl BreedLabel {
    /// Returns the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Breed(name) => name,
            Self::NonTarget => NON_TARGET_LABEL,
            Self::Unknown => UNKNOWN_LABEL,
        }
    }

    /// Returns the breed name when the label is a named registry breed.
    #[must_use]
    pub fn breed(&self) -> Option<&str> {
        match self {
            Self::Breed(name) => Some(name),
            Self::NonTarget | Self::Unknown => None,
        }
    }
}

impl fmt::Display for BreedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for BreedLabel {
    fn from(s: &str) -> Self {
        match s {
            NON_TARGET_LABEL => Self::NonTarget,
            UNKNOWN_LABEL => Self::Unknown,
            name => Self::Breed(name.to_string()),
        }
    }
}

impl Serialize for BreedLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BreedLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Regulatory status, or the reason classification failed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationStatus {
    /// Final breed is a regulated breed.
    #[serde(rename = "regulated")]
    Regulated,
    /// Final breed is not regulated (including non-target).
    #[serde(rename = "not regulated")]
    NotRegulated,
    /// No feature vector was available.
    #[serde(rename = "unclassifiable")]
    Unclassifiable,
    /// Feature keys differ from the schema.
    #[serde(rename = "classification failed (key mismatch)")]
    KeyMismatch,
    /// A feature value is not a finite number.
    #[serde(rename = "classification failed (bad value)")]
    BadValue,
}

impl ClassificationStatus {
    /// Status text as emitted in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regulated => "regulated",
            Self::NotRegulated => "not regulated",
            Self::Unclassifiable => "unclassifiable",
            Self::KeyMismatch => "classification failed (key mismatch)",
            Self::BadValue => "classification failed (bad value)",
        }
    }

    /// Maps a regulated flag onto a status.
    #[must_use]
    pub const fn from_regulated(regulated: bool) -> Self {
        if regulated {
            Self::Regulated
        } else {
            Self::NotRegulated
        }
    }

    /// Whether the status reports a failed classification.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Unclassifiable | Self::KeyMismatch | Self::BadValue)
    }
}

impl fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FeatureError> for ClassificationStatus {
    fn from(err: &FeatureError) -> Self {
        match err {
            FeatureError::Empty => Self::Unclassifiable,
            FeatureError::KeyMismatch { .. } => Self::KeyMismatch,
            FeatureError::BadValue { .. } => Self::BadValue,
        }
    }
}

/// Distance from the input to one breed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedDistance {
    /// Breed name.
    pub breed: String,
    /// Weighted Euclidean distance.
    pub raw: f64,
    /// Distance after the regulated-breed penalty.
    pub adjusted: f64,
}

/// Verdict of the weighted-distance classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Nearest breed, non-target after rejection, or unknown on failure.
    pub breed: BreedLabel,
    /// Regulatory status or failure reason.
    pub status: ClassificationStatus,
    /// Rejection threshold in effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Adjusted distance of the nearest profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Per-breed distances in registry order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distances: Vec<BreedDistance>,
}

impl ClassificationResult {
    /// A failed classification with the given status.
    #[must_use]
    pub const fn failed(status: ClassificationStatus) -> Self {
        Self {
            breed: BreedLabel::Unknown,
            status,
            threshold: None,
            distance: None,
            distances: Vec::new(),
        }
    }

    /// Whether classification failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Whether the classifier settled on a named registry breed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.breed, BreedLabel::Breed(_))
    }
}

impl From<&FeatureError> for ClassificationResult {
    fn from(err: &FeatureError) -> Self {
        Self::failed(ClassificationStatus::from(err))
    }
}
