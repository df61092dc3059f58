//! Preliminary judgments from the independent categorical judge.

use serde::{Deserialize, Serialize};

/// Raw text recorded when the judge could not produce an answer.
pub const FAILED_JUDGMENT_TEXT: &str = "judgment failed";

/// Category a free-text judgment maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "breed", rename_all = "snake_case")]
pub enum JudgmentCategory {
    /// One of the target breeds, by registry name.
    Target(String),
    /// Anything outside the target breeds.
    NonTarget,
}

/// A categorized free-text breed judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreliminaryJudgment {
    /// Text as returned by the judge.
    pub text: String,
    /// Vocabulary category of the text.
    pub category: JudgmentCategory,
}

impl PreliminaryJudgment {
    /// The judgment used when the judge call failed.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            text: FAILED_JUDGMENT_TEXT.to_string(),
            category: JudgmentCategory::NonTarget,
        }
    }

    /// Whether the judge named a target breed.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        matches!(self.category, JudgmentCategory::Target(_))
    }

    /// Target breed named by the judge, if any.
    #[must_use]
    pub fn target_breed(&self) -> Option<&str> {
        match &self.category {
            JudgmentCategory::Target(breed) => Some(breed),
            JudgmentCategory::NonTarget => None,
        }
    }
}
