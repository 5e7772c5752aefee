use crate::mib;

/// Crate-wide result type for downloads.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Why a media group yielded no downloadable item.
///
/// Scoped to one group; a failing group never aborts its siblings.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A candidate answered 200 but the payload is over the attachment cap.
    /// The image counts as found; it is just not deliverable.
    #[error("image is {size:.2} MiB, over the attachment limit", size = mib(*size_bytes))]
    Oversized { size_bytes: usize },

    /// Every candidate in the group errored or answered non-200.
    #[error("no candidate succeeded after {attempts} attempts")]
    Exhausted {
        attempts: usize,
        /// Last transport-level error seen, kept for diagnostics.
        last_error: Option<String>,
    },
}

impl FetchError {
    #[must_use]
    pub fn is_oversized(&self) -> bool {
        matches!(self, Self::Oversized { .. })
    }
}
