//! Sink for finished triage records.

use crate::domain::TriageRecord;

/// Receives one record per triaged image.
pub trait ResultOutput: Send + Sync {
    /// Emits `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn write(&self, record: &TriageRecord) -> anyhow::Result<()>;

    /// Pushes anything still buffered to its destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the flush.
    fn flush(&self) -> anyhow::Result<()>;
}
