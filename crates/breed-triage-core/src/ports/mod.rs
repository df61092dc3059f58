//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the triage core and the
//! adapters that load images, query models and emit records.

mod feature_extractor;
mod image_source;
mod judgment_source;
mod progress;
mod result_output;

pub use feature_extractor::FeatureExtractor;
pub use image_source::ImageSource;
pub use judgment_source::JudgmentSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
