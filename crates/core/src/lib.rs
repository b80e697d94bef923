//! Core domain types, marker scanning, and slide-sequence composition
//! for Google Slides presentations.

pub mod adapter;
pub mod engine;
pub mod error;
pub mod markers;
pub mod memory;
pub mod planner;
pub mod service;
pub mod types;
pub mod url;

pub use adapter::{AdapterError, AdapterErrorKind, SlideMutation, SlidesAdapter};
pub use engine::{compose, BoundPlan};
pub use error::{Error, Result};
pub use markers::MarkerKind;
pub use memory::MemorySlides;
pub use planner::{plan, sequence_from_counts, CompositionPlan, CopyOp};
pub use types::{
    ComposedPresentation, Page, PageElement, Presentation, SequenceRequest, SlideDescriptor,
};
pub use url::{extract_folder_id, extract_presentation_id, presentation_url};
