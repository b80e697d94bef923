//! Request-level operations: what a transport layer calls.
//!
//! Each function fetches what it needs through the adapter, then hands the
//! data to the scanner, planner, or engine.

use crate::adapter::SlidesAdapter;
use crate::engine::compose;
use crate::error::{Error, Result};
use crate::markers::{self, MarkerKind};
use crate::planner::sequence_from_counts;
use crate::types::{ComposedPresentation, Presentation, SequenceRequest, SlideDescriptor};
use std::collections::BTreeMap;

async fn fetch<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    presentation_id: &str,
) -> Result<Presentation> {
    adapter
        .fetch_presentation(presentation_id)
        .await
        .map_err(|source| Error::Adapter {
            target: None,
            source,
        })
}

/// Slide index → `$identifier` tokens. Slides without identifiers are omitted.
pub async fn extract_slide_ids<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    presentation_id: &str,
) -> Result<BTreeMap<usize, Vec<String>>> {
    let presentation = fetch(adapter, presentation_id).await?;
    Ok(markers::scan(&presentation, MarkerKind::Identifier)
        .into_iter()
        .map(|(index, found)| (index, found.into_iter().collect()))
        .collect())
}

/// Distinct `#component` tokens on one slide.
pub async fn slide_components<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    presentation_id: &str,
    slide_index: usize,
) -> Result<Vec<String>> {
    let presentation = fetch(adapter, presentation_id).await?;
    Ok(markers::scan_components(&presentation, slide_index)?
        .into_iter()
        .collect())
}

/// Every slide with its index, object id, and identifiers.
pub async fn list_slides<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    presentation_id: &str,
) -> Result<Vec<SlideDescriptor>> {
    let presentation = fetch(adapter, presentation_id).await?;
    Ok(markers::slide_descriptors(&presentation))
}

/// Index of the first slide carrying every identifier in `wanted`.
pub async fn find_slide<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    presentation_id: &str,
    wanted: &[String],
) -> Result<Option<usize>> {
    let presentation = fetch(adapter, presentation_id).await?;
    Ok(markers::find_slide_with_identifiers(&presentation, wanted))
}

/// Compose a new presentation from `request.sequence`.
pub async fn compose_sequence<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    request: &SequenceRequest,
) -> Result<ComposedPresentation> {
    compose(adapter, request).await
}

/// Compose a new presentation where each source slide appears `counts[i]` times.
///
/// Slides missing from `counts` appear once; a count of 0 drops the slide.
pub async fn compose_counts<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    source_presentation_id: &str,
    counts: &BTreeMap<usize, usize>,
    target_container: Option<String>,
    new_name: Option<String>,
) -> Result<ComposedPresentation> {
    let inventory = adapter
        .fetch_slide_inventory(source_presentation_id)
        .await
        .map_err(Error::SeedFailed)?;
    let sequence = sequence_from_counts(inventory.len(), counts)?;

    let request = SequenceRequest {
        source_presentation_id: source_presentation_id.to_string(),
        target_container,
        new_name,
        sequence,
    };
    compose(adapter, &request).await
}
