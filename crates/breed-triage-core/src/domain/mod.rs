//! Core domain types for breed triage.

mod classification;
mod decision;
mod features;
mod judgment;
mod profile;
mod record;

pub use classification::{
    BreedDistance, BreedLabel, ClassificationResult, ClassificationStatus, NON_TARGET_LABEL,
    UNKNOWN_LABEL,
};
pub use decision::{ArbitrationDecision, Rationale};
pub use features::{FeatureError, FeatureKey, FeatureVector, RawFeatures};
pub use judgment::{JudgmentCategory, PreliminaryJudgment, FAILED_JUDGMENT_TEXT};
pub use profile::BreedProfile;
pub use record::{ImageDimensions, ImageInfo, TriageRecord};
