use thiserror::Error;

/// Errors raised while turning a plane boundary into screen-space dots.
///
/// None of these ever escape [`crate::OverlayState`]; they surface only from
/// [`crate::PolygonSampler::try_sample`] and in per-plane update summaries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("malformed boundary: {len} scalar values (need an even count of at least 6)")]
    MalformedBoundary { len: usize },

    #[error("sampling failed: {0}")]
    SamplingFailure(String),
}

/// Convenience type alias for results using [`OverlayError`].
pub type Result<T> = std::result::Result<T, OverlayError>;
