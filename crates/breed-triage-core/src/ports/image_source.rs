//! Where the photographs come from.

use crate::domain::ImageInfo;

/// Supplies encoded photographs, one per dog.
pub trait ImageSource: Send + Sync {
    /// Walks the source once, in a stable order.
    ///
    /// # Errors
    ///
    /// A photograph that cannot be read is yielded as an error item; the
    /// remaining items are unaffected.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Number of photographs `images` will yield, when cheap to know.
    fn count_hint(&self) -> Option<usize>;
}
