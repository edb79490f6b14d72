//! Batch planning: how many chapters go into each volume

use crate::error::ConfigError;
use crate::types::{total_size, BatchSpec};
use serde::Serialize;

/// What happens to a planned batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Merged into a new volume
    Volume,
    /// A single chapter left as its own archive
    Leftover,
}

/// One contiguous group of the regular-file list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedBatch {
    pub size: usize,
    pub kind: BatchKind,
}

impl PlannedBatch {
    pub fn volume(size: usize) -> Self {
        Self {
            size,
            kind: BatchKind::Volume,
        }
    }

    pub fn leftover() -> Self {
        Self {
            size: 1,
            kind: BatchKind::Leftover,
        }
    }

    pub fn is_volume(&self) -> bool {
        self.kind == BatchKind::Volume
    }
}

/// Split `file_count` chapters into consecutive batches.
///
/// The sizes of the returned batches always add up to `file_count`.
/// Chapters that do not fill a batch either become [`BatchKind::Leftover`]
/// singletons or, with `merge_leftovers`, are absorbed into volumes.
pub fn plan_batches(
    file_count: usize,
    spec: &BatchSpec,
    merge_leftovers: bool,
) -> Result<Vec<PlannedBatch>, ConfigError> {
    if file_count == 0 {
        return Ok(Vec::new());
    }

    match spec {
        BatchSpec::Repeating(size) => plan_repeating(file_count, *size, merge_leftovers),
        BatchSpec::Explicit(sizes) => plan_explicit(file_count, sizes, merge_leftovers),
    }
}

fn plan_repeating(
    file_count: usize,
    size: usize,
    merge_leftovers: bool,
) -> Result<Vec<PlannedBatch>, ConfigError> {
    if size == 0 {
        return Err(ConfigError::ZeroBatchSize);
    }

    let full = file_count / size;
    let remainder = file_count % size;

    if remainder == 0 {
        return Ok(vec![PlannedBatch::volume(size); full]);
    }

    if !merge_leftovers {
        let mut plan = vec![PlannedBatch::volume(size); full];
        plan.extend(std::iter::repeat(PlannedBatch::leftover()).take(remainder));
        return Ok(plan);
    }

    if full == 0 {
        return Ok(vec![PlannedBatch::volume(file_count)]);
    }

    // Spread the remainder evenly, earlier volumes take the extra chapter
    let each = remainder / full;
    let extra = remainder % full;
    Ok((0..full)
        .map(|i| PlannedBatch::volume(size + each + usize::from(i < extra)))
        .collect())
}

fn plan_explicit(
    file_count: usize,
    sizes: &[usize],
    merge_leftovers: bool,
) -> Result<Vec<PlannedBatch>, ConfigError> {
    if sizes.is_empty() {
        return Err(ConfigError::InvalidBatchSizes(String::new()));
    }
    if sizes.contains(&0) {
        return Err(ConfigError::ZeroBatchSize);
    }

    let planned = total_size(sizes)?;
    if planned > file_count {
        return Err(ConfigError::PlanExceedsFiles {
            planned,
            available: file_count,
        });
    }

    let mut plan: Vec<PlannedBatch> = sizes.iter().map(|&s| PlannedBatch::volume(s)).collect();

    // A merged remainder becomes one more volume of whatever is left
    let remainder = file_count - planned;
    if remainder > 0 {
        if merge_leftovers {
            plan.push(PlannedBatch::volume(remainder));
        } else {
            plan.extend(std::iter::repeat(PlannedBatch::leftover()).take(remainder));
        }
    }

    Ok(plan)
}

/// Number of files left untouched by a plan
pub fn leftover_count(plan: &[PlannedBatch]) -> usize {
    plan.iter().filter(|b| !b.is_volume()).map(|b| b.size).sum()
}

/// Sizes of the batches in a plan, in order
pub fn plan_sizes(plan: &[PlannedBatch]) -> Vec<usize> {
    plan.iter().map(|b| b.size).collect()
}
