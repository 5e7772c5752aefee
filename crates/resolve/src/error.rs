/// Crate-wide result type for metadata resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a provider's metadata could not be resolved.
///
/// Callers surface these to the user, so the variants keep "the service is
/// unreachable or erroring" distinguishable from "the post has no media".
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The metadata request never completed (connect failure, timeout).
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The metadata endpoint answered with a non-success status.
    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    /// The response body did not parse into the expected shape.
    #[error("unexpected provider response: {0}")]
    Body(#[from] serde_json::Error),

    /// The post exists but carries no media entries.
    #[error("no media found")]
    NoMedia,
}

impl ResolveError {
    /// True when the post itself had nothing to download, as opposed to the
    /// provider being unreachable or erroring.
    #[must_use]
    pub fn is_no_media(&self) -> bool {
        matches!(self, Self::NoMedia)
    }
}
