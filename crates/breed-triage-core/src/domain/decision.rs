//! Final arbitration decisions.

use serde::{Deserialize, Serialize};

use super::{BreedLabel, ClassificationStatus};

/// Which arbitration rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    /// The judge did not name a target breed.
    JudgeVeto,
    /// The classifier rejected every profile as too distant.
    ClassifierVeto,
    /// Judge and classifier named the same breed.
    Consistent,
    /// Judge and classifier named different target breeds.
    Conflict,
    /// The classifier failed; its status is forwarded unchanged.
    PassThrough,
}

impl Rationale {
    /// Plain-text prefix used in decision notes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JudgeVeto => "judge veto",
            Self::ClassifierVeto => "classifier veto",
            Self::Consistent => "consistent",
            Self::Conflict => "conflict",
            Self::PassThrough => "pass-through",
        }
    }
}

/// Outcome of reconciling the judge with the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationDecision {
    /// Final breed.
    pub final_breed: BreedLabel,
    /// Final regulatory status, or the forwarded failure.
    pub final_status: ClassificationStatus,
    /// Rule that decided.
    pub rationale: Rationale,
    /// Human-readable explanation, prefixed with the rationale.
    pub note: String,
}

impl ArbitrationDecision {
    /// Whether the final status is regulated.
    #[must_use]
    pub fn is_regulated(&self) -> bool {
        self.final_status == ClassificationStatus::Regulated
    }
}
