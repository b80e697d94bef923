//! The remote presentation API as seen by the composition engine.

use crate::types::{Presentation, SlideDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad category of a remote failure. The core never looks deeper than this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterErrorKind {
    /// Connection failed or was reset.
    Transport,
    /// The per-call timeout expired.
    Timeout,
    /// Missing or insufficient credentials.
    PermissionDenied,
    /// The presentation or folder does not exist.
    NotFound,
    /// Any other error status returned by the remote API.
    Api,
    /// The response could not be decoded.
    Decode,
    /// The remote side rejected a mutation batch.
    Rejected,
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::Api => "api",
            Self::Decode => "decode",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Failure of a single adapter call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(AdapterErrorKind::NotFound, format!("presentation '{}' not found", id))
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Rejected, message)
    }
}

/// One instruction in a slide mutation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideMutation {
    /// Copy a slide. The copy is given `new_object_id`.
    DuplicateSlide {
        object_id: String,
        new_object_id: String,
    },
    /// Remove a slide.
    DeleteSlide { object_id: String },
    /// Rearrange the presentation so its slides appear exactly in this order.
    SetSlideOrder { object_ids: Vec<String> },
}

/// Narrow contract over the remote presentation service.
///
/// Each method is a single suspension point with no partial results.
/// Implementations enforce their own per-call timeouts.
#[async_trait]
pub trait SlidesAdapter: Send + Sync {
    /// Fetch the full presentation, including every slide's elements.
    async fn fetch_presentation(&self, presentation_id: &str) -> Result<Presentation, AdapterError>;

    /// Fetch the slides' object ids and positions.
    async fn fetch_slide_inventory(
        &self,
        presentation_id: &str,
    ) -> Result<Vec<SlideDescriptor>, AdapterError> {
        Ok(self.fetch_presentation(presentation_id).await?.inventory())
    }

    /// Create a full duplicate of `source_id`, returning the new presentation's id.
    ///
    /// When `name` is `None` the name is derived from the source's name.
    async fn duplicate_presentation(
        &self,
        source_id: &str,
        target_container: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, AdapterError>;

    /// Apply `mutations` in order. Either the whole batch is reflected or none of it.
    async fn apply_slide_mutations(
        &self,
        presentation_id: &str,
        mutations: &[SlideMutation],
    ) -> Result<(), AdapterError>;

    /// Fetch the slide object ids in presentation order.
    async fn fetch_slide_order(&self, presentation_id: &str) -> Result<Vec<String>, AdapterError> {
        Ok(self.fetch_presentation(presentation_id).await?.slide_order())
    }

    /// Permanently delete a presentation.
    ///
    /// The composition engine never calls this; callers use it to discard
    /// targets orphaned by a failed composition.
    async fn delete_presentation(&self, presentation_id: &str) -> Result<(), AdapterError>;
}
