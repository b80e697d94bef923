//! Error types for marker scanning and slide composition.

use crate::adapter::AdapterError;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning or composing presentations.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested slide sequence is empty or references a missing slide.
    ///
    /// Raised before any remote call is made.
    #[error("Invalid slide sequence: {reason}")]
    InvalidSequence {
        /// Position of the first offending entry within the sequence.
        position: Option<usize>,
        /// The offending slide index.
        entry: Option<usize>,
        /// Human-readable description.
        reason: String,
    },

    /// A scan referenced a slide index the presentation does not have.
    #[error("Slide index {index} is out of range (presentation has {slide_count} slides)")]
    OutOfRange { index: usize, slide_count: usize },

    /// A presentation URL lacked the `/d/{id}` segment.
    #[error("Could not extract a presentation id from: {0}")]
    MalformedUrl(String),

    /// Duplicating the source presentation failed; no target was created.
    #[error("Failed to seed target presentation: {0}")]
    SeedFailed(#[source] AdapterError),

    /// A remote call failed. `target` names the orphaned presentation, if any.
    #[error("Remote call failed: {source}")]
    Adapter {
        target: Option<String>,
        #[source]
        source: AdapterError,
    },

    /// The target's slide order did not match the planned order after mutation.
    #[error(
        "Slide order mismatch in {target}: expected {} slides, found {}",
        .expected.len(),
        .actual.len()
    )]
    OrderMismatch {
        target: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl Error {
    pub(crate) fn invalid_sequence(reason: impl Into<String>) -> Self {
        Self::InvalidSequence {
            position: None,
            entry: None,
            reason: reason.into(),
        }
    }

    /// Stable name of the failure kind, used in structured failure payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSequence { .. } => "InvalidSequence",
            Self::OutOfRange { .. } => "OutOfRange",
            Self::MalformedUrl(_) => "MalformedUrl",
            Self::SeedFailed(_) => "SeedFailed",
            Self::Adapter { .. } => "AdapterError",
            Self::OrderMismatch { .. } => "OrderMismatch",
        }
    }

    /// The presentation left behind by a failed composition, if one was created.
    ///
    /// `None` means no new presentation exists and nothing needs discarding.
    pub fn orphaned_target(&self) -> Option<&str> {
        match self {
            Self::Adapter { target, .. } => target.as_deref(),
            Self::OrderMismatch { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Whether the failure was caused by the caller's input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSequence { .. } | Self::OutOfRange { .. } | Self::MalformedUrl(_)
        )
    }
}
