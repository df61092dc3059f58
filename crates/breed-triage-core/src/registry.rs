//! Breed profile registry.
//!
//! Holds the per-breed ideal vectors, feature weights and regulated flags.
//! A registry is built once, validated, and then only read.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::{BreedProfile, FeatureKey, FeatureVector};

/// Names of the built-in target breeds.
pub mod breeds {
    /// American Pit Bull Terrier. Regulated.
    pub const APBT: &str = "美國比特鬥牛犬 (APBT)";
    /// American Staffordshire Terrier. Regulated.
    pub const AMSTAFF: &str = "美國史大佛夏牛頭犬 (AmStaff)";
    /// Staffordshire Bull Terrier.
    pub const SBT: &str = "史大佛夏牛頭犬 (SBT)";
    /// American Bully.
    pub const AMERICAN_BULLY: &str = "美國惡霸犬 (American Bully)";
}

/// Invalid registry definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No profiles were given.
    #[error("registry must contain at least one profile")]
    Empty,

    /// A profile has a blank name.
    #[error("profile name must not be empty")]
    EmptyName,

    /// Two profiles share a name.
    #[error("duplicate profile '{0}'")]
    DuplicateName(String),

    /// An ideal or weight value is NaN or infinite.
    #[error("profile '{breed}' has a non-finite value for '{key}'")]
    NonFinite {
        /// Profile name.
        breed: String,
        /// Offending feature.
        key: FeatureKey,
    },

    /// A weight lies outside 0.0..=1.0.
    #[error("profile '{breed}' weight for '{key}' must be 0.0-1.0, got {value}")]
    WeightOutOfRange {
        /// Profile name.
        breed: String,
        /// Offending feature.
        key: FeatureKey,
        /// Offending weight.
        value: f64,
    },

    /// Every weight of a profile is zero.
    #[error("profile '{breed}' needs at least one nonzero weight")]
    NoWeights {
        /// Profile name.
        breed: String,
    },
}

/// Immutable, ordered set of breed profiles.
///
/// Iteration order is the construction order and decides classifier ties.
#[derive(Debug, Clone)]
pub struct BreedRegistry {
    profiles: Vec<BreedProfile>,
}

impl BreedRegistry {
    /// Builds a registry from profiles, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the list is empty, names are blank or
    /// repeated, values are not finite, weights fall outside 0.0..=1.0, or a
    /// profile has only zero weights.
    pub fn new(profiles: Vec<BreedProfile>) -> Result<Self, RegistryError> {
        validate(&profiles)?;
        Ok(Self { profiles })
    }

    /// The built-in regulatory reference table.
    #[must_use]
    pub fn builtin() -> Self {
        let profiles = builtin_profiles();
        debug_assert!(validate(&profiles).is_ok(), "built-in profiles are valid");
        Self { profiles }
    }

    /// All profiles in registry order.
    #[must_use]
    pub fn profiles(&self) -> &[BreedProfile] {
        &self.profiles
    }

    /// The canonical feature schema every profile is defined over.
    #[must_use]
    pub const fn schema_keys(&self) -> &'static [FeatureKey] {
        &FeatureKey::ALL
    }

    /// Looks up a profile by name.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&BreedProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Whether `name` is a known breed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.profile(name).is_some()
    }

    /// Whether `name` is a regulated breed. Unknown names are not regulated.
    #[must_use]
    pub fn is_regulated(&self, name: &str) -> bool {
        self.profile(name).is_some_and(|p| p.regulated)
    }

    /// Ideal vector of a named profile.
    #[must_use]
    pub fn ideal(&self, name: &str) -> Option<&FeatureVector> {
        self.profile(name).map(|p| &p.ideal)
    }

    /// Weight vector of a named profile.
    #[must_use]
    pub fn weight(&self, name: &str) -> Option<&FeatureVector> {
        self.profile(name).map(|p| &p.weight)
    }

    /// Names of the regulated breeds, in registry order.
    pub fn regulated_breeds(&self) -> impl Iterator<Item = &str> {
        self.profiles
            .iter()
            .filter(|p| p.regulated)
            .map(|p| p.name.as_str())
    }
}

impl Default for BreedRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate(profiles: &[BreedProfile]) -> Result<(), RegistryError> {
    if profiles.is_empty() {
        return Err(RegistryError::Empty);
    }

    let mut seen = HashSet::new();
    for profile in profiles {
        if profile.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if !seen.insert(profile.name.as_str()) {
            return Err(RegistryError::DuplicateName(profile.name.clone()));
        }

        for key in FeatureKey::ALL {
            let (ideal, weight) = (profile.ideal[key], profile.weight[key]);
            if !ideal.is_finite() || !weight.is_finite() {
                return Err(RegistryError::NonFinite {
                    breed: profile.name.clone(),
                    key,
                });
            }
            if !(0.0..=1.0).contains(&weight) {
                return Err(RegistryError::WeightOutOfRange {
                    breed: profile.name.clone(),
                    key,
                    value: weight,
                });
            }
        }

        if profile.weight.iter().all(|(_, w)| w == 0.0) {
            return Err(RegistryError::NoWeights {
                breed: profile.name.clone(),
            });
        }
    }

    Ok(())
}

// Schema order: shoulder-height, body-weight, muzzle-head, black-nose,
// blue-eyes, chest-width-depth, squareness, head-breadth.
fn builtin_profiles() -> Vec<BreedProfile> {
    vec![
        // Muzzle:skull about 2:3, any nose colour, chest no wider than deep.
        BreedProfile::new(
            breeds::APBT,
            FeatureVector::new([0.60, 0.50, 0.70, 0.50, 1.00, 0.50, 0.50, 0.60]),
            FeatureVector::new([0.60, 0.50, 1.00, 0.00, 0.80, 0.70, 0.60, 0.80]),
            true,
        ),
        // Broad skull, rounded muzzle, nose always black.
        BreedProfile::new(
            breeds::AMSTAFF,
            FeatureVector::new([0.60, 0.60, 0.60, 1.00, 1.00, 0.60, 0.50, 0.85]),
            FeatureVector::new([0.60, 0.50, 0.90, 1.00, 0.60, 0.60, 0.60, 1.00]),
            true,
        ),
        // Smaller, square build, short broad skull, nose always black.
        BreedProfile::new(
            breeds::SBT,
            FeatureVector::new([0.35, 0.35, 0.50, 1.00, 1.00, 0.60, 1.00, 0.80]),
            FeatureVector::new([0.90, 0.80, 0.80, 1.00, 0.40, 0.50, 1.00, 0.80]),
            false,
        ),
        // Muzzle 25-35% of head length, heavy and wide, any nose colour.
        BreedProfile::new(
            breeds::AMERICAN_BULLY,
            FeatureVector::new([0.50, 0.90, 0.30, 0.50, 1.00, 0.90, 0.30, 1.00]),
            FeatureVector::new([0.50, 0.90, 1.00, 0.00, 0.80, 0.80, 0.70, 0.90]),
            false,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn profile(name: &str) -> BreedProfile {
        BreedProfile::new(
            name,
            FeatureVector::splat(0.5),
            FeatureVector::splat(1.0),
            false,
        )
    }

    #[test]
    fn test_builtin_profiles_are_valid() {
        assert!(BreedRegistry::new(builtin_profiles()).is_ok());
    }

    #[test]
    fn test_builtin_order_and_flags() {
        let registry = BreedRegistry::builtin();
        let names: Vec<_> = registry.profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [breeds::APBT, breeds::AMSTAFF, breeds::SBT, breeds::AMERICAN_BULLY]
        );

        assert!(registry.is_regulated(breeds::APBT));
        assert!(registry.is_regulated(breeds::AMSTAFF));
        assert!(!registry.is_regulated(breeds::SBT));
        assert!(!registry.is_regulated(breeds::AMERICAN_BULLY));
        assert!(!registry.is_regulated("golden retriever"));

        let regulated: Vec<_> = registry.regulated_breeds().collect();
        assert_eq!(regulated, [breeds::APBT, breeds::AMSTAFF]);
    }

    #[test]
    fn test_schema_keys() {
        let registry = BreedRegistry::builtin();
        assert_eq!(registry.schema_keys().len(), 8);
        assert_eq!(registry.schema_keys(), &FeatureKey::ALL);
    }

    #[test]
    fn test_accessors() {
        let registry = BreedRegistry::builtin();
        let ideal = registry.ideal(breeds::APBT).unwrap();
        assert_eq!(ideal[FeatureKey::MuzzleHeadRatio], 0.70);

        let weight = registry.weight(breeds::AMERICAN_BULLY).unwrap();
        assert_eq!(weight[FeatureKey::BlackNoseRequired], 0.0);

        assert!(registry.ideal("poodle").is_none());
        assert!(registry.contains(breeds::SBT));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(BreedRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = BreedRegistry::new(vec![profile("a"), profile("a")]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("a".into()));
    }

    #[test]
    fn test_rejects_blank_name() {
        let err = BreedRegistry::new(vec![profile("  ")]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }

    #[test]
    fn test_rejects_weight_out_of_range() {
        let mut p = profile("a");
        p.weight = p.weight.with(FeatureKey::BodySquareness, 1.5);

        let err = BreedRegistry::new(vec![p]).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::WeightOutOfRange { key: FeatureKey::BodySquareness, .. }
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut p = profile("a");
        p.ideal = p.ideal.with(FeatureKey::HeadBreadthIndex, f64::NAN);

        let err = BreedRegistry::new(vec![p]).unwrap_err();
        assert!(matches!(err, RegistryError::NonFinite { .. }));
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let mut p = profile("a");
        p.weight = FeatureVector::splat(0.0);

        let err = BreedRegistry::new(vec![p]).unwrap_err();
        assert_eq!(err, RegistryError::NoWeights { breed: "a".into() });
    }
}
