//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use breed_triage_core::{
    FeatureExtractor, ImageInfo, ImageSource, JudgmentSource, ProgressEvent, ProgressSink,
    RawFeatures, ResultOutput, TriageRecord,
};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images, or load errors for chosen paths.
pub struct MockImageSource {
    images: Vec<Result<ImageInfo, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            images: images.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an entry that fails to load with `reason`.
    #[must_use]
    pub fn with_failure(mut self, reason: &str) -> Self {
        self.images.push(Err(reason.to_string()));
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Box::new(self.images.iter().map(|entry| match entry {
            Ok(info) => Ok(info.clone()),
            Err(reason) => Err(anyhow::anyhow!("{reason}")),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock feature extractor answering per image path.
///
/// Paths without an answer get the fallback, which is `Ok(None)` unless
/// changed.
pub struct MockFeatureExtractor {
    answers: HashMap<String, Result<Option<RawFeatures>, String>>,
    fallback: Result<Option<RawFeatures>, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFeatureExtractor {
    /// Creates an extractor that returns no features.
    #[must_use]
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Ok(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns `features` for every image.
    #[must_use]
    pub fn always(features: RawFeatures) -> Self {
        Self {
            fallback: Ok(Some(features)),
            ..Self::new()
        }
    }

    /// Fails every call with `reason`.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            fallback: Err(reason.to_string()),
            ..Self::new()
        }
    }

    /// Returns `features` for `path`.
    #[must_use]
    pub fn with(mut self, path: &str, features: RawFeatures) -> Self {
        self.answers.insert(path.to_string(), Ok(Some(features)));
        self
    }

    /// Fails calls for `path` with `reason`.
    #[must_use]
    pub fn with_error(mut self, path: &str, reason: &str) -> Self {
        self.answers.insert(path.to_string(), Err(reason.to_string()));
        self
    }

    /// Paths the extractor was called with, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for MockFeatureExtractor {
    fn extract(&self, image: &ImageInfo) -> anyhow::Result<Option<RawFeatures>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(image.path.clone());
        match self.answers.get(&image.path).unwrap_or(&self.fallback) {
            Ok(features) => Ok(features.clone()),
            Err(reason) => Err(anyhow::anyhow!("{reason}")),
        }
    }
}

/// Mock judge answering per image path.
pub struct MockJudgmentSource {
    answers: HashMap<String, Result<String, String>>,
    fallback: Result<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockJudgmentSource {
    /// Answers `text` for every image.
    #[must_use]
    pub fn always(text: &str) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: Ok(text.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every call with `reason`.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            fallback: Err(reason.to_string()),
            ..Self::always("")
        }
    }

    /// Answers `text` for `path`.
    #[must_use]
    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.answers.insert(path.to_string(), Ok(text.to_string()));
        self
    }

    /// Paths the judge was called with, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl JudgmentSource for MockJudgmentSource {
    fn judge(&self, image: &ImageInfo) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(image.path.clone());
        self.answers
            .get(&image.path)
            .unwrap_or(&self.fallback)
            .clone()
            .map_err(|reason| anyhow::anyhow!("{reason}"))
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures records for later assertions.
pub struct MockResultOutput {
    records: Arc<Mutex<Vec<TriageRecord>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured records.
    #[must_use]
    pub fn records(&self) -> Vec<TriageRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, record: &TriageRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns `(processed, skipped, regulated)` from the `Finished` event.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                processed,
                skipped,
                regulated,
            } => Some((*processed, *skipped, *regulated)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
