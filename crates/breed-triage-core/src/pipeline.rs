//! Per-image triage: collaborator calls, classification and arbitration.

use std::thread;

use tracing::{debug, warn};

use crate::arbiter::arbitrate;
use crate::classifier::{PnnClassifier, TrustToggles};
use crate::domain::{
    ArbitrationDecision, ClassificationResult, ImageInfo, PreliminaryJudgment, RawFeatures,
    TriageRecord,
};
use crate::ports::{FeatureExtractor, JudgmentSource};
use crate::registry::BreedRegistry;
use crate::vocabulary::Vocabulary;

/// Everything decided about one image.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOutcome {
    /// Categorized judge answer.
    pub judgment: PreliminaryJudgment,
    /// Classifier verdict.
    pub classification: ClassificationResult,
    /// Final decision.
    pub decision: ArbitrationDecision,
}

impl TriageOutcome {
    /// Turns the outcome into a record for `image`.
    #[must_use]
    pub fn into_record(self, image: &ImageInfo, timestamp: String) -> TriageRecord {
        TriageRecord {
            path: image.path.clone(),
            timestamp,
            dimensions: image.dimensions,
            judgment: self.judgment,
            classification: self.classification,
            decision: self.decision,
        }
    }
}

/// Registry and vocabulary shared by every image in a run.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    registry: BreedRegistry,
    vocabulary: Vocabulary,
}

impl TriageEngine {
    /// Creates an engine from a registry and a vocabulary over it.
    #[must_use]
    pub const fn new(registry: BreedRegistry, vocabulary: Vocabulary) -> Self {
        Self {
            registry,
            vocabulary,
        }
    }

    /// Engine over the built-in registry and synonyms.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BreedRegistry::builtin(), Vocabulary::builtin())
    }

    /// The registry.
    #[must_use]
    pub const fn registry(&self) -> &BreedRegistry {
        &self.registry
    }

    /// The judgment vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Classifier over this engine's registry.
    #[must_use]
    pub const fn classifier(&self) -> PnnClassifier<'_> {
        PnnClassifier::new(&self.registry)
    }

    /// Classifies `features` and arbitrates against `judgment_text`.
    #[must_use]
    pub fn evaluate(
        &self,
        features: Option<&RawFeatures>,
        judgment_text: &str,
        toggles: TrustToggles,
    ) -> TriageOutcome {
        let judgment = self.vocabulary.judge(judgment_text);
        self.decide(features, judgment, toggles)
    }

    /// Runs the extractor and the judge on `image` in parallel, then
    /// classifies and arbitrates.
    ///
    /// Collaborator errors never escape: a failed extraction counts as an
    /// absent feature vector and a failed judge as the failed judgment.
    #[must_use]
    pub fn triage(
        &self,
        image: &ImageInfo,
        extractor: &dyn FeatureExtractor,
        judge: &dyn JudgmentSource,
        toggles: TrustToggles,
    ) -> TriageOutcome {
        let (features, judgment) = thread::scope(|scope| {
            let extraction = scope.spawn(|| extractor.extract(image));
            let judgment = judge.judge(image);
            let features = extraction
                .join()
                .unwrap_or_else(|_| Err(anyhow::anyhow!("feature extractor panicked")));
            (features, judgment)
        });

        let features = features.unwrap_or_else(|e| {
            warn!("Feature extraction failed for {}: {e:#}", image.path);
            None
        });
        let judgment = match judgment {
            Ok(text) => {
                debug!("Judgment for {}: {text}", image.path);
                self.vocabulary.judge(text)
            }
            Err(e) => {
                warn!("Judgment failed for {}: {e:#}", image.path);
                PreliminaryJudgment::failed()
            }
        };

        self.decide(features.as_ref(), judgment, toggles)
    }

    fn decide(
        &self,
        features: Option<&RawFeatures>,
        judgment: PreliminaryJudgment,
        toggles: TrustToggles,
    ) -> TriageOutcome {
        let classification = self.classifier().classify(features, toggles);
        let decision = arbitrate(&judgment, &classification);
        TriageOutcome {
            judgment,
            classification,
            decision,
        }
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;
    use crate::domain::{BreedLabel, ClassificationStatus, ImageDimensions, Rationale};
    use crate::registry::breeds;

    struct FixedExtractor(anyhow::Result<Option<RawFeatures>>);

    impl FeatureExtractor for FixedExtractor {
        fn extract(&self, _image: &ImageInfo) -> anyhow::Result<Option<RawFeatures>> {
            match &self.0 {
                Ok(features) => Ok(features.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    struct FixedJudge(Option<&'static str>);

    impl JudgmentSource for FixedJudge {
        fn judge(&self, _image: &ImageInfo) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("model unavailable"))
        }
    }

    /// Both collaborators wait on the same barrier, so the test only
    /// finishes when they run at the same time.
    struct Rendezvous(Arc<Barrier>, RawFeatures);

    impl FeatureExtractor for Rendezvous {
        fn extract(&self, _image: &ImageInfo) -> anyhow::Result<Option<RawFeatures>> {
            self.0.wait();
            Ok(Some(self.1.clone()))
        }
    }

    impl JudgmentSource for Rendezvous {
        fn judge(&self, _image: &ImageInfo) -> anyhow::Result<String> {
            self.0.wait();
            Ok("amstaff".into())
        }
    }

    fn image() -> ImageInfo {
        ImageInfo::new("dog.jpg", vec![0xFF, 0xD8]).with_dimensions(ImageDimensions::new(64, 48))
    }

    fn amstaff_features(engine: &TriageEngine) -> RawFeatures {
        engine.registry().ideal(breeds::AMSTAFF).unwrap().to_raw()
    }

    #[test]
    fn test_triage_consistent_regulated() {
        let engine = TriageEngine::builtin();
        let outcome = engine.triage(
            &image(),
            &FixedExtractor(Ok(Some(amstaff_features(&engine)))),
            &FixedJudge(Some("AmStaff")),
            TrustToggles::default(),
        );

        assert_eq!(outcome.judgment.target_breed(), Some(breeds::AMSTAFF));
        assert_eq!(outcome.classification.status, ClassificationStatus::Regulated);
        assert_eq!(outcome.decision.rationale, Rationale::Consistent);
        assert!(outcome.decision.is_regulated());
    }

    #[test]
    fn test_extractor_error_becomes_unclassifiable() {
        let engine = TriageEngine::builtin();
        let outcome = engine.triage(
            &image(),
            &FixedExtractor(Err(anyhow::anyhow!("connection refused"))),
            &FixedJudge(Some("APBT")),
            TrustToggles::default(),
        );

        assert_eq!(outcome.classification.status, ClassificationStatus::Unclassifiable);
        assert_eq!(outcome.decision.rationale, Rationale::PassThrough);
        assert_eq!(outcome.decision.final_status, ClassificationStatus::Unclassifiable);
    }

    #[test]
    fn test_judge_error_becomes_failed_judgment() {
        let engine = TriageEngine::builtin();
        let outcome = engine.triage(
            &image(),
            &FixedExtractor(Ok(Some(amstaff_features(&engine)))),
            &FixedJudge(None),
            TrustToggles::default(),
        );

        assert_eq!(outcome.judgment, PreliminaryJudgment::failed());
        assert_eq!(outcome.decision.rationale, Rationale::JudgeVeto);
        assert_eq!(outcome.decision.final_breed, BreedLabel::NonTarget);
    }

    #[test]
    fn test_collaborators_run_concurrently() {
        let engine = TriageEngine::builtin();
        let both = Rendezvous(Arc::new(Barrier::new(2)), amstaff_features(&engine));

        // Deadlocks if the calls are made one after the other.
        let outcome = engine.triage(&image(), &both, &both, TrustToggles::default());
        assert_eq!(outcome.decision.rationale, Rationale::Consistent);
    }

    #[test]
    fn test_evaluate_without_collaborators() {
        let engine = TriageEngine::builtin();
        let features = amstaff_features(&engine);

        let outcome = engine.evaluate(Some(&features), "golden retriever", TrustToggles::default());
        assert_eq!(outcome.decision.rationale, Rationale::JudgeVeto);
        assert_eq!(outcome.classification.status, ClassificationStatus::Regulated);

        let outcome = engine.evaluate(None, "AmStaff", TrustToggles::default());
        assert_eq!(outcome.decision.final_status, ClassificationStatus::Unclassifiable);
    }

    #[test]
    fn test_out_of_range_trust_passes_through_as_bad_value() {
        let engine = TriageEngine::builtin();
        let sbt = engine
            .registry()
            .ideal(breeds::SBT)
            .unwrap()
            .with(crate::domain::FeatureKey::BlueEyesForbidden, 0.0)
            .to_raw();

        let outcome = engine.triage(
            &image(),
            &FixedExtractor(Ok(Some(sbt))),
            &FixedJudge(Some("apbt")),
            TrustToggles::new(-3.0, 1.0, 1.0),
        );

        assert_eq!(outcome.classification.status, ClassificationStatus::BadValue);
        assert_eq!(outcome.decision.rationale, Rationale::PassThrough);
        assert!(!outcome.decision.is_regulated());
    }

    #[test]
    fn test_into_record_copies_image_metadata() {
        let engine = TriageEngine::builtin();
        let image = image();
        let record = engine
            .evaluate(None, "pit bull", TrustToggles::default())
            .into_record(&image, "2024-01-01T00:00:00Z".into());

        assert_eq!(record.path, "dog.jpg");
        assert_eq!(record.dimensions, Some(ImageDimensions::new(64, 48)));
        assert_eq!(record.judgment.target_breed(), Some(breeds::APBT));
    }
}
