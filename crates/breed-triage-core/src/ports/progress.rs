//! Batch progress notifications.

use crate::domain::TriageRecord;

/// What happened to the batch so far.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// An image was handed to the collaborators.
    Started {
        /// Path to the image.
        path: String,
        /// Position in the batch, from 0.
        index: usize,
        /// Batch size, when the source knows it.
        total: Option<usize>,
    },
    /// An image received its final decision.
    Completed {
        /// The finished record.
        record: Box<TriageRecord>,
    },
    /// An image could not be read and was left out.
    Skipped {
        /// Path to the image.
        path: String,
        /// Why it was left out.
        reason: String,
    },
    /// The source is exhausted.
    Finished {
        /// Images triaged.
        processed: usize,
        /// Images skipped.
        skipped: usize,
        /// Images whose final status is regulated.
        regulated: usize,
    },
}

/// Receives progress events from the batch loop.
pub trait ProgressSink: Send + Sync {
    /// Handles one event. Must not block the batch for long.
    fn on_event(&self, event: ProgressEvent);
}
