//! Errors contained by a layout pass.
//!
//! None of these abort the caller: each is logged to the diagnostics log and
//! the pass either skips the element or (for [`LayoutError::DomTraversalFailure`])
//! stops with the commands emitted so far.

use crate::metrics::MeasureError;

/// A failure handled inside a layout pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The text measurer rejected a font or string; the element is skipped.
    #[error("measurement failed for <{tag}>: {source}")]
    MeasurementFailure {
        /// Tag of the element being measured.
        tag: String,
        /// Underlying measurer error.
        #[source]
        source: MeasureError,
    },

    /// An image could not be fetched or decoded.
    #[error("image load/decode error: {url}: {detail}")]
    ImageResolutionFailure {
        /// The image URL, truncated for display.
        url: String,
        /// What went wrong, truncated for display.
        detail: String,
    },

    /// An image URL used a scheme other than `http`/`https`. The resolver was
    /// never called.
    #[error("[Security] blocked insecure image URL: {url_prefix}")]
    InsecureSchemeRejected {
        /// The first characters of the rejected URL.
        url_prefix: String,
    },

    /// The DOM could not be walked (dangling node or a cycle).
    #[error("DOM traversal failed: {reason}")]
    DomTraversalFailure {
        /// What the walker ran into.
        reason: String,
    },
}

impl LayoutError {
    /// Whether this error ended the pass early.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DomTraversalFailure { .. })
    }
}
