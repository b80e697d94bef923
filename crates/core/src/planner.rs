//! Turns a requested slide sequence into a composition plan.
//!
//! The target presentation is seeded as a full duplicate of the source, so
//! seeded slide `i` is the copy of source slide `i`. The first request of a
//! source slide keeps that seeded copy; later requests duplicate it; seeded
//! slides nobody asked for are deleted.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One requested use of a source slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOp {
    /// Index of the slide in the source (and seeded target) presentation.
    pub source_index: usize,

    /// 0 for the first request of `source_index`, 1 for the second, ...
    pub occurrence: usize,
}

impl CopyOp {
    /// Whether this occurrence reuses the seeded slide rather than a duplicate.
    pub fn reuses_seed(&self) -> bool {
        self.occurrence == 0
    }
}

/// Operations needed to realize a sequence in a freshly seeded target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionPlan {
    /// One entry per requested slide, in request order.
    pub copy_ops: Vec<CopyOp>,

    /// Final arrangement as positions into `copy_ops`.
    pub final_order: Vec<usize>,

    /// Seeded slide indices no copy op references, in ascending order.
    pub deletions: Vec<usize>,
}

impl CompositionPlan {
    /// Number of slides the target will have.
    pub fn target_len(&self) -> usize {
        self.final_order.len()
    }

    /// Number of duplicate-slide instructions the plan needs.
    pub fn duplicate_count(&self) -> usize {
        self.copy_ops.iter().filter(|op| !op.reuses_seed()).count()
    }
}

/// Plan the composition of `sequence` from a source with `source_slide_count` slides.
pub fn plan(source_slide_count: usize, sequence: &[usize]) -> Result<CompositionPlan> {
    if sequence.is_empty() {
        return Err(Error::invalid_sequence("sequence must contain at least one slide"));
    }

    if let Some((position, &entry)) = sequence
        .iter()
        .enumerate()
        .find(|(_, &entry)| entry >= source_slide_count)
    {
        return Err(Error::InvalidSequence {
            position: Some(position),
            entry: Some(entry),
            reason: format!(
                "entry {} at position {} is out of range (source has {} slides)",
                entry, position, source_slide_count
            ),
        });
    }

    let mut seen = vec![0usize; source_slide_count];
    let copy_ops: Vec<CopyOp> = sequence
        .iter()
        .map(|&source_index| {
            let occurrence = seen[source_index];
            seen[source_index] += 1;
            CopyOp {
                source_index,
                occurrence,
            }
        })
        .collect();

    let deletions = seen
        .iter()
        .enumerate()
        .filter(|(_, &count)| count == 0)
        .map(|(index, _)| index)
        .collect();

    Ok(CompositionPlan {
        final_order: (0..copy_ops.len()).collect(),
        copy_ops,
        deletions,
    })
}

/// Expand a per-slide count map into a sequence.
///
/// Every source slide appears `counts[i]` times, 1 when absent, in source
/// order. A count of 0 drops the slide.
pub fn sequence_from_counts(
    source_slide_count: usize,
    counts: &BTreeMap<usize, usize>,
) -> Result<Vec<usize>> {
    if let Some(&index) = counts.keys().find(|&&index| index >= source_slide_count) {
        return Err(Error::InvalidSequence {
            position: None,
            entry: Some(index),
            reason: format!(
                "count given for slide {} but source has {} slides",
                index, source_slide_count
            ),
        });
    }

    Ok((0..source_slide_count)
        .flat_map(|index| {
            let count = counts.get(&index).copied().unwrap_or(1);
            std::iter::repeat(index).take(count)
        })
        .collect())
}
