//! Consensus arbiter.
//!
//! Reconciles the categorical judgment with the classifier verdict as a
//! two-stage gate: the judge can only veto, the classifier can only veto or
//! confirm, and when both name a target breed the classifier is
//! authoritative. Scores are never blended.

use tracing::info;

use crate::domain::{
    ArbitrationDecision, BreedLabel, ClassificationResult, ClassificationStatus,
    PreliminaryJudgment, Rationale,
};

/// Produces the final decision for one image.
#[must_use]
pub fn arbitrate(
    judgment: &PreliminaryJudgment,
    classification: &ClassificationResult,
) -> ArbitrationDecision {
    let decision = decide(judgment, classification);
    info!(
        rationale = decision.rationale.as_str(),
        "Final decision: {} ({})",
        decision.final_breed,
        decision.final_status
    );
    decision
}

fn decide(judgment: &PreliminaryJudgment, classification: &ClassificationResult) -> ArbitrationDecision {
    if classification.is_failure() {
        return decision(
            classification.breed.clone(),
            classification.status,
            Rationale::PassThrough,
            format!("classifier reported '{}'", classification.status),
        );
    }

    let Some(judged) = judgment.target_breed() else {
        return decision(
            BreedLabel::NonTarget,
            ClassificationStatus::NotRegulated,
            Rationale::JudgeVeto,
            format!("judgment '{}' names no target breed", judgment.text),
        );
    };

    let Some(classified) = classification.breed.breed() else {
        let detail = match (classification.distance, classification.threshold) {
            (Some(distance), Some(threshold)) => {
                format!("nearest distance {distance:.4} exceeds threshold {threshold}")
            }
            _ => "no profile is close enough".to_string(),
        };
        return decision(
            BreedLabel::NonTarget,
            ClassificationStatus::NotRegulated,
            Rationale::ClassifierVeto,
            format!("judgment '{}' named a target breed but {detail}", judgment.text),
        );
    };

    if judged == classified {
        decision(
            classification.breed.clone(),
            classification.status,
            Rationale::Consistent,
            format!("judgment '{}' and classifier agree on {classified}", judgment.text),
        )
    } else {
        decision(
            classification.breed.clone(),
            classification.status,
            Rationale::Conflict,
            format!(
                "judgment '{}' suggests {judged} but classifier found {classified}; classifier result is final",
                judgment.text
            ),
        )
    }
}

fn decision(
    final_breed: BreedLabel,
    final_status: ClassificationStatus,
    rationale: Rationale,
    detail: String,
) -> ArbitrationDecision {
    ArbitrationDecision {
        final_breed,
        final_status,
        rationale,
        note: format!("{}: {detail}", rationale.as_str()),
    }
}
