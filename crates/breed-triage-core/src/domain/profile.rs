//! Breed reference profiles.

use serde::Serialize;

use super::FeatureVector;

/// Reference profile of one target breed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedProfile {
    /// Breed name; the identity of the profile.
    pub name: String,
    /// Ideal score per feature.
    pub ideal: FeatureVector,
    /// Importance per feature in 0.0..=1.0. Zero excludes the feature.
    pub weight: FeatureVector,
    /// Whether the breed is subject to regulatory restriction.
    pub regulated: bool,
}

impl BreedProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ideal: FeatureVector,
        weight: FeatureVector,
        regulated: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ideal,
            weight,
            regulated,
        }
    }
}
