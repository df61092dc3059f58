//! Breed Triage Core - Domain logic for regulated-breed triage
//!
//! This crate contains the breed profile registry, the weighted-distance
//! classifier, the judgment vocabulary, the consensus arbiter and the port
//! traits the adapters implement.

pub mod arbiter;
pub mod classifier;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod vocabulary;

pub use arbiter::arbitrate;
pub use classifier::{
    weighted_distance, PnnClassifier, TrustError, TrustToggles, REGULATED_PENALTY,
    REJECTION_THRESHOLD,
};
pub use domain::{
    ArbitrationDecision, BreedDistance, BreedLabel, BreedProfile, ClassificationResult,
    ClassificationStatus, FeatureError, FeatureKey, FeatureVector, ImageDimensions, ImageInfo,
    JudgmentCategory, PreliminaryJudgment, Rationale, RawFeatures, TriageRecord,
};
pub use pipeline::{TriageEngine, TriageOutcome};
pub use ports::{
    FeatureExtractor, ImageSource, JudgmentSource, ProgressEvent, ProgressSink, ResultOutput,
};
pub use registry::{breeds, BreedRegistry, RegistryError};
pub use vocabulary::{Vocabulary, VocabularyError};
