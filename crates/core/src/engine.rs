//! Composition engine: seed a full duplicate of the source, then re-sequence it.
//!
//! One invocation runs strictly in order: validate, seed, re-sequence,
//! verify. Mutations are sent as a single batch in fixed phase order
//! (duplicate, then delete, then one reorder) so no instruction depends on
//! slide indices that earlier instructions may have shifted.

use crate::adapter::{SlideMutation, SlidesAdapter};
use crate::error::{Error, Result};
use crate::planner::{plan, CompositionPlan};
use crate::types::{ComposedPresentation, SequenceRequest, SlideDescriptor};
use crate::url::presentation_url;
use uuid::Uuid;

/// A plan bound to the object ids of a seeded target presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPlan {
    /// Mutation batch: duplicates, then deletions, then the final reorder.
    pub mutations: Vec<SlideMutation>,

    /// Object ids the target must list, in order, once the batch is applied.
    pub expected_order: Vec<String>,
}

impl BoundPlan {
    /// Bind `plan` to the seeded slides, naming each duplicate with `new_id`.
    ///
    /// Returns `None` if the seeded inventory lacks a slide the plan refers to.
    pub fn bind(
        plan: &CompositionPlan,
        seeded: &[SlideDescriptor],
        mut new_id: impl FnMut() -> String,
    ) -> Option<Self> {
        let seeded_id = |index: usize| seeded.get(index).map(|s| s.object_id.clone());

        let mut duplicates = Vec::with_capacity(plan.duplicate_count());
        let mut slot_ids = Vec::with_capacity(plan.copy_ops.len());
        for op in &plan.copy_ops {
            let object_id = seeded_id(op.source_index)?;
            if op.reuses_seed() {
                slot_ids.push(object_id);
            } else {
                let new_object_id = new_id();
                slot_ids.push(new_object_id.clone());
                duplicates.push(SlideMutation::DuplicateSlide {
                    object_id,
                    new_object_id,
                });
            }
        }

        let deletions = plan
            .deletions
            .iter()
            .map(|&index| seeded_id(index).map(|object_id| SlideMutation::DeleteSlide { object_id }))
            .collect::<Option<Vec<_>>>()?;

        let expected_order: Vec<String> = plan
            .final_order
            .iter()
            .map(|&position| slot_ids[position].clone())
            .collect();

        let mut mutations = duplicates;
        mutations.extend(deletions);
        mutations.push(SlideMutation::SetSlideOrder {
            object_ids: expected_order.clone(),
        });

        Some(Self {
            mutations,
            expected_order,
        })
    }
}

/// Object id for a generated slide.
pub fn generated_slide_id() -> String {
    format!("gen_slide_{}", Uuid::new_v4().simple())
}

/// Build a new presentation holding the requested slides in the requested order.
///
/// The source presentation is only read. On failure after seeding, the
/// error's [`Error::orphaned_target`] names the presentation left behind.
pub async fn compose<A>(adapter: &A, request: &SequenceRequest) -> Result<ComposedPresentation>
where
    A: SlidesAdapter + ?Sized,
{
    // Validate.
    if request.sequence.is_empty() {
        return Err(Error::invalid_sequence("sequence must contain at least one slide"));
    }
    let source_id = request.source_presentation_id.as_str();
    // An unreadable source cannot be seeded from.
    let source = adapter
        .fetch_slide_inventory(source_id)
        .await
        .map_err(Error::SeedFailed)?;
    let plan = plan(source.len(), &request.sequence)?;
    log::debug!(
        "Planned {} slides from {} ({} duplicates, {} deletions)",
        plan.target_len(),
        source_id,
        plan.duplicate_count(),
        plan.deletions.len()
    );

    // Seed.
    let target = adapter
        .duplicate_presentation(
            source_id,
            request.target_container.as_deref(),
            request.new_name.as_deref(),
        )
        .await
        .map_err(Error::SeedFailed)?;
    log::debug!("Seeded {} from {}", target, source_id);

    let in_target = |source| Error::Adapter {
        target: Some(target.clone()),
        source,
    };

    // Re-sequence.
    let seeded = adapter.fetch_slide_inventory(&target).await.map_err(in_target)?;
    let bound = if seeded.len() == source.len() {
        BoundPlan::bind(&plan, &seeded, generated_slide_id)
    } else {
        None
    };
    let Some(bound) = bound else {
        return Err(Error::OrderMismatch {
            target: target.clone(),
            expected: source.into_iter().map(|s| s.object_id).collect(),
            actual: seeded.into_iter().map(|s| s.object_id).collect(),
        });
    };
    adapter
        .apply_slide_mutations(&target, &bound.mutations)
        .await
        .map_err(in_target)?;

    // Verify.
    let actual = adapter.fetch_slide_order(&target).await.map_err(in_target)?;
    if actual != bound.expected_order {
        return Err(Error::OrderMismatch {
            target,
            expected: bound.expected_order,
            actual,
        });
    }

    let url = presentation_url(&target);
    Ok(ComposedPresentation {
        presentation_id: target,
        url,
    })
}
