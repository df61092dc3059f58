//! Test support utilities for breed-triage.
//!
//! Provides feature builders, image fixtures and mock ports for testing
//! the triage pipeline without a model server.
//!
//! # Example
//!
//! ```
//! use breed_triage_core::breeds;
//! use breed_triage_test_support::{FeatureBuilder, MockFeatureExtractor, MockJudgmentSource};
//!
//! let extractor = MockFeatureExtractor::always(FeatureBuilder::ideal(breeds::SBT).raw());
//! let judge = MockJudgmentSource::always("staffy");
//! ```

mod builders;
mod mocks;

pub use builders::{FeatureBuilder, FixtureWriter, SyntheticImageBuilder};
pub use mocks::{
    MockFeatureExtractor, MockImageSource, MockJudgmentSource, MockProgressSink, MockResultOutput,
};
