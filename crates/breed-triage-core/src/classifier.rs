//! Weighted-distance breed classifier ("PNN").
//!
//! Computes a weighted Euclidean distance from the input to every registry
//! profile, penalizes regulated breeds, and picks the nearest profile unless
//! it is still farther than the rejection threshold.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    BreedDistance, BreedLabel, BreedProfile, ClassificationResult, ClassificationStatus,
    FeatureKey, FeatureVector, RawFeatures,
};
use crate::registry::BreedRegistry;

/// Multiplier applied to the distance of regulated breeds.
pub const REGULATED_PENALTY: f64 = 1.15;

/// Adjusted distances above this are rejected as non-target.
pub const REJECTION_THRESHOLD: f64 = 2.0;

/// A trust value outside 0.0-1.0, or not a number at all.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{name} must be 0.0-1.0, got {value}")]
pub struct TrustError {
    /// Toggle name: `eye`, `nose` or `clothing`.
    pub name: &'static str,
    /// The rejected value.
    pub value: f64,
}

/// Caller confidence in features the image may have made unreliable.
///
/// Each toggle scales the weight of exactly one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustToggles {
    /// Scales `blue-eyes-forbidden`.
    pub eye_trust: f64,
    /// Scales `black-nose-required`.
    pub nose_trust: f64,
    /// Scales `body-weight-norm` (clothing hides body shape).
    pub clothing_trust: f64,
}

impl TrustToggles {
    /// Full trust in every feature.
    pub const FULL: Self = Self::new(1.0, 1.0, 1.0);

    /// Creates toggles from the three trust values.
    #[must_use]
    pub const fn new(eye_trust: f64, nose_trust: f64, clothing_trust: f64) -> Self {
        Self {
            eye_trust,
            nose_trust,
            clothing_trust,
        }
    }

    /// Creates toggles, rejecting any value outside 0.0-1.0.
    pub fn try_new(
        eye_trust: f64,
        nose_trust: f64,
        clothing_trust: f64,
    ) -> Result<Self, TrustError> {
        let toggles = Self::new(eye_trust, nose_trust, clothing_trust);
        toggles.validate()?;
        Ok(toggles)
    }

    /// Checks one trust value. NaN is out of range.
    pub fn check(name: &'static str, value: f64) -> Result<f64, TrustError> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(TrustError { name, value })
        }
    }

    /// Checks every toggle, reporting the first bad one.
    pub fn validate(&self) -> Result<(), TrustError> {
        Self::check("eye", self.eye_trust)?;
        Self::check("nose", self.nose_trust)?;
        Self::check("clothing", self.clothing_trust)?;
        Ok(())
    }

    /// Weight multiplier for `key`.
    #[must_use]
    pub const fn factor(&self, key: FeatureKey) -> f64 {
        match key {
            FeatureKey::BlueEyesForbidden => self.eye_trust,
            FeatureKey::BlackNoseRequired => self.nose_trust,
            FeatureKey::BodyWeightNorm => self.clothing_trust,
            _ => 1.0,
        }
    }
}

impl Default for TrustToggles {
    fn default() -> Self {
        Self::FULL
    }
}

/// Weighted Euclidean distance between `features` and a profile's ideal.
///
/// A profile whose effective weights are all zero is at distance 0.
#[must_use]
pub fn weighted_distance(
    features: &FeatureVector,
    profile: &BreedProfile,
    toggles: TrustToggles,
) -> f64 {
    FeatureKey::ALL
        .iter()
        .map(|&key| {
            let weight = profile.weight[key] * toggles.factor(key);
            let diff = features[key] - profile.ideal[key];
            weight * diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Nearest-profile classifier over a [`BreedRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct PnnClassifier<'a> {
    registry: &'a BreedRegistry,
}

impl<'a> PnnClassifier<'a> {
    /// Creates a classifier over `registry`.
    #[must_use]
    pub const fn new(registry: &'a BreedRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry this classifier reads.
    #[must_use]
    pub const fn registry(&self) -> &'a BreedRegistry {
        self.registry
    }

    /// Classifies a raw extractor mapping.
    ///
    /// An absent or empty mapping is unclassifiable; a mapping that fails
    /// schema validation yields the matching failure status. Failures never
    /// produce a partial result.
    #[must_use]
    pub fn classify(&self, features: Option<&RawFeatures>, toggles: TrustToggles) -> ClassificationResult {
        let Some(raw) = features else {
            warn!("No feature vector supplied");
            return ClassificationResult::failed(ClassificationStatus::Unclassifiable);
        };

        match FeatureVector::from_raw(raw) {
            Ok(vector) => self.classify_vector(&vector, toggles),
            Err(e) => {
                warn!("Feature vector rejected: {e}");
                ClassificationResult::from(&e)
            }
        }
    }

    /// Classifies a validated feature vector.
    ///
    /// Out-of-range toggles, or a distance that is not finite, fail with
    /// [`ClassificationStatus::BadValue`].
    #[must_use]
    pub fn classify_vector(&self, features: &FeatureVector, toggles: TrustToggles) -> ClassificationResult {
        if let Err(e) = toggles.validate() {
            warn!("Trust toggles rejected: {e}");
            return ClassificationResult::failed(ClassificationStatus::BadValue);
        }

        let distances = self.distances(features, toggles);
        if let Some(d) = distances.iter().find(|d| !d.adjusted.is_finite()) {
            warn!(
                "Distance to {} is not finite ({}); feature values too large",
                d.breed, d.adjusted
            );
            return ClassificationResult::failed(ClassificationStatus::BadValue);
        }

        // Strict comparison keeps the first breed on ties.
        let mut nearest: Option<&BreedDistance> = None;
        for candidate in &distances {
            if nearest.map_or(true, |n| candidate.adjusted < n.adjusted) {
                nearest = Some(candidate);
            }
        }
        let Some(nearest) = nearest else {
            return ClassificationResult::failed(ClassificationStatus::Unclassifiable);
        };

        let distance = nearest.adjusted;
        let (breed, status) = if distance > REJECTION_THRESHOLD {
            debug!(
                "Nearest profile {} at {distance:.4} exceeds threshold {REJECTION_THRESHOLD}",
                nearest.breed
            );
            (BreedLabel::NonTarget, ClassificationStatus::NotRegulated)
        } else {
            let status = ClassificationStatus::from_regulated(self.registry.is_regulated(&nearest.breed));
            (BreedLabel::Breed(nearest.breed.clone()), status)
        };
        debug!("Classified as {breed} ({status}) at distance {distance:.4}");

        ClassificationResult {
            breed,
            status,
            threshold: Some(REJECTION_THRESHOLD),
            distance: Some(distance),
            distances,
        }
    }

    /// Raw and penalty-adjusted distance to every profile, in registry order.
    #[must_use]
    pub fn distances(&self, features: &FeatureVector, toggles: TrustToggles) -> Vec<BreedDistance> {
        self.registry
            .profiles()
            .iter()
            .map(|profile| {
                let raw = weighted_distance(features, profile, toggles);
                let adjusted = if profile.regulated {
                    raw * REGULATED_PENALTY
                } else {
                    raw
                };
                debug!("Distance to {}: {raw:.4} (adjusted {adjusted:.4})", profile.name);
                BreedDistance {
                    breed: profile.name.clone(),
                    raw,
                    adjusted,
                }
            })
            .collect()
    }
}
