//! Feature schema and schema-validated feature vectors.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Unvalidated feature mapping as delivered by an extractor.
pub type RawFeatures = serde_json::Map<String, serde_json::Value>;

/// One of the eight normalized morphology features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKey {
    /// Shoulder height, normalized.
    ShoulderHeightNorm,
    /// Body weight, normalized. Scaled by the clothing trust toggle.
    BodyWeightNorm,
    /// Muzzle length relative to head length.
    MuzzleHeadRatio,
    /// Degree to which the nose is unambiguously black. Scaled by nose trust.
    BlackNoseRequired,
    /// Degree to which the eyes are not blue. Scaled by eye trust.
    BlueEyesForbidden,
    /// Chest width relative to chest depth.
    ChestWidthDepth,
    /// Side-profile squareness (height vs. length).
    BodySquareness,
    /// Skull breadth index.
    HeadBreadthIndex,
}

impl FeatureKey {
    /// Number of keys in the schema.
    pub const COUNT: usize = 8;

    /// All keys in canonical schema order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::ShoulderHeightNorm,
        Self::BodyWeightNorm,
        Self::MuzzleHeadRatio,
        Self::BlackNoseRequired,
        Self::BlueEyesForbidden,
        Self::ChestWidthDepth,
        Self::BodySquareness,
        Self::HeadBreadthIndex,
    ];

    /// Wire name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShoulderHeightNorm => "shoulder-height-norm",
            Self::BodyWeightNorm => "body-weight-norm",
            Self::MuzzleHeadRatio => "muzzle-head-ratio",
            Self::BlackNoseRequired => "black-nose-required",
            Self::BlueEyesForbidden => "blue-eyes-forbidden",
            Self::ChestWidthDepth => "chest-width-depth",
            Self::BodySquareness => "body-squareness",
            Self::HeadBreadthIndex => "head-breadth-index",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.as_str() == s).ok_or(())
    }
}

/// Reasons a raw feature mapping cannot become a [`FeatureVector`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// No features were supplied at all.
    #[error("feature vector is empty")]
    Empty,

    /// The key set differs from the schema.
    #[error(
        "feature keys do not match schema (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    KeyMismatch {
        /// Schema keys absent from the input.
        missing: Vec<String>,
        /// Input keys that are not part of the schema.
        unexpected: Vec<String>,
    },

    /// A value is not coercible to a finite float.
    #[error("feature '{key}' is not a finite number: {value}")]
    BadValue {
        /// Offending key.
        key: String,
        /// The raw value as JSON text.
        value: String,
    },
}

/// A complete, schema-validated set of feature scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FeatureKey::COUNT]);

impl FeatureVector {
    /// Creates a vector from values in [`FeatureKey::ALL`] order.
    #[must_use]
    pub const fn new(values: [f64; FeatureKey::COUNT]) -> Self {
        Self(values)
    }

    /// Builds a vector by evaluating `f` for every schema key.
    #[must_use]
    pub fn from_fn(f: impl FnMut(FeatureKey) -> f64) -> Self {
        Self(FeatureKey::ALL.map(f))
    }

    /// Builds a vector with every key set to `value`.
    #[must_use]
    pub const fn splat(value: f64) -> Self {
        Self([value; FeatureKey::COUNT])
    }

    /// Validates a raw extractor mapping.
    ///
    /// Key-set equality is checked before any value is coerced, so a mapping
    /// that is wrong in both respects reports [`FeatureError::KeyMismatch`].
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the mapping is empty, its keys differ from
    /// the schema, or any value is not a finite number.
    pub fn from_raw(raw: &RawFeatures) -> Result<Self, FeatureError> {
        if raw.is_empty() {
            return Err(FeatureError::Empty);
        }

        let unexpected: Vec<String> = raw
            .keys()
            .filter(|k| k.parse::<FeatureKey>().is_err())
            .cloned()
            .collect();
        let missing: Vec<String> = FeatureKey::ALL
            .iter()
            .filter(|k| !raw.contains_key(k.as_str()))
            .map(|k| k.as_str().to_string())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(FeatureError::KeyMismatch {
                missing,
                unexpected,
            });
        }

        let mut values = [0.0; FeatureKey::COUNT];
        for key in FeatureKey::ALL {
            let value = &raw[key.as_str()];
            values[key.index()] = coerce(value).ok_or_else(|| FeatureError::BadValue {
                key: key.as_str().to_string(),
                value: value.to_string(),
            })?;
        }
        Ok(Self(values))
    }

    /// Returns the score for `key`.
    #[must_use]
    pub const fn get(&self, key: FeatureKey) -> f64 {
        self.0[key.index()]
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: FeatureKey, value: f64) -> Self {
        self.0[key.index()] = value;
        self
    }

    /// Iterates `(key, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        FeatureKey::ALL.into_iter().map(|k| (k, self.get(k)))
    }

    /// Converts back into the raw wire form.
    #[must_use]
    pub fn to_raw(&self) -> RawFeatures {
        self.iter()
            .map(|(k, v)| (k.as_str().to_string(), serde_json::Value::from(v)))
            .collect()
    }
}

impl Index<FeatureKey> for FeatureVector {
    type Output = f64;

    fn index(&self, key: FeatureKey) -> &f64 {
        &self.0[key.index()]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FeatureKey::COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

/// Numbers and numeric strings coerce; everything else does not.
fn coerce(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawFeatures {
        value.as_object().cloned().expect("object literal")
    }

    fn full_raw() -> RawFeatures {
        raw(json!({
            "shoulder-height-norm": 0.6,
            "body-weight-norm": 0.5,
            "muzzle-head-ratio": 0.7,
            "black-nose-required": 0.5,
            "blue-eyes-forbidden": 1.0,
            "chest-width-depth": 0.5,
            "body-squareness": 0.5,
            "head-breadth-index": 0.6,
        }))
    }

    #[test]
    fn test_key_round_trips_through_str() {
        for key in FeatureKey::ALL {
            assert_eq!(key.as_str().parse::<FeatureKey>(), Ok(key));
        }
        assert!("MuzzleHeadRatio".parse::<FeatureKey>().is_err());
    }

    #[test]
    fn test_serde_name_matches_wire_name() {
        for key in FeatureKey::ALL {
            let encoded = serde_json::to_value(key).unwrap();
            assert_eq!(encoded, json!(key.as_str()));
        }
    }

    #[test]
    fn test_from_raw_accepts_full_vector() {
        let vector = FeatureVector::from_raw(&full_raw()).expect("valid vector");
        assert_eq!(vector[FeatureKey::MuzzleHeadRatio], 0.7);
        assert_eq!(vector.get(FeatureKey::BlueEyesForbidden), 1.0);
    }

    #[test]
    fn test_from_raw_empty() {
        assert_eq!(
            FeatureVector::from_raw(&RawFeatures::new()),
            Err(FeatureError::Empty)
        );
    }

    #[test]
    fn test_from_raw_missing_key() {
        let mut features = full_raw();
        features.remove("head-breadth-index");

        let err = FeatureVector::from_raw(&features).unwrap_err();
        assert_eq!(
            err,
            FeatureError::KeyMismatch {
                missing: vec!["head-breadth-index".into()],
                unexpected: vec![],
            }
        );
    }

    #[test]
    fn test_from_raw_extra_key() {
        let mut features = full_raw();
        features.insert("coat-shortness".into(), json!(1.0));

        let err = FeatureVector::from_raw(&features).unwrap_err();
        assert!(matches!(err, FeatureError::KeyMismatch { ref unexpected, .. } if unexpected == &["coat-shortness"]));
    }

    #[test]
    fn test_key_mismatch_reported_before_bad_value() {
        let mut features = full_raw();
        features.insert("muzzle-head-ratio".into(), json!("long"));
        features.remove("body-squareness");

        assert!(matches!(
            FeatureVector::from_raw(&features),
            Err(FeatureError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_from_raw_coerces_numeric_strings() {
        let mut features = full_raw();
        features.insert("body-weight-norm".into(), json!(" 0.25 "));

        let vector = FeatureVector::from_raw(&features).expect("numeric string coerces");
        assert_eq!(vector[FeatureKey::BodyWeightNorm], 0.25);
    }

    #[test]
    fn test_from_raw_rejects_non_numeric_values() {
        for bad in [json!("black"), json!(null), json!(true), json!([0.5]), json!("NaN"), json!("inf")] {
            let mut features = full_raw();
            features.insert("black-nose-required".into(), bad.clone());

            let err = FeatureVector::from_raw(&features).unwrap_err();
            assert!(
                matches!(err, FeatureError::BadValue { ref key, .. } if key == "black-nose-required"),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_to_raw_round_trip() {
        let vector = FeatureVector::from_fn(|k| k as usize as f64 / 10.0);
        assert_eq!(FeatureVector::from_raw(&vector.to_raw()), Ok(vector));
    }

    #[test]
    fn test_error_messages_name_keys() {
        let err = FeatureError::KeyMismatch {
            missing: vec!["body-squareness".into()],
            unexpected: vec!["tail".into()],
        };
        let message = err.to_string();
        assert!(message.contains("body-squareness"));
        assert!(message.contains("tail"));
    }
}
