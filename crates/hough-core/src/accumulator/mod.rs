//! Vote accumulators.
//!
//! Three backings share one contract ([`Accumulator`]):
//! - [`DenseAccumulator`]: every bin allocated, used by exhaustive voting and
//!   by peak extraction;
//! - [`SparseAccumulator`]: per first-axis bin a sorted `(bin, count)` list,
//!   for fine bins that receive few votes;
//! - [`SparseVolume`]: dense 2D grid of sorted lists over a third axis.
//!
//! `increment` is edge-triggered: it reports [`Vote::Peak`] exactly once per
//! cell, on the vote that makes the count equal the threshold.

mod dense;
mod sparse;
mod volume;

pub use dense::{DenseAccumulator, DEFAULT_MAX_CELLS};
pub use sparse::{SparseAccumulator, SparseColumn};
pub use volume::SparseVolume;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("accumulator dimensions must be non-zero (got {dims:?})")]
    EmptyDimensions { dims: Vec<usize> },
    #[error("accumulator of {requested} cells exceeds the limit of {limit} cells")]
    TooLarge { requested: usize, limit: usize },
    #[error("failed to allocate {cells} accumulator cells")]
    AllocationFailed { cells: usize },
}

/// Outcome of a single vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote<C> {
    /// Counted, threshold not reached on this vote.
    Pending,
    /// This vote brought the cell to the threshold.
    Peak(C),
    /// The cell lies outside the accumulator; nothing was counted.
    OutOfRange,
}

impl<C> Vote<C> {
    pub fn peak(self) -> Option<C> {
        match self {
            Vote::Peak(c) => Some(c),
            _ => None,
        }
    }
}

/// Shared accumulator contract.
pub trait Accumulator {
    type Cell: Copy;

    fn increment(&mut self, cell: Self::Cell) -> Vote<Self::Cell>;
    fn count(&self, cell: Self::Cell) -> u32;
    fn threshold(&self) -> u32;
    fn set_threshold(&mut self, threshold: u32);
    /// Zero every count, keeping allocations.
    fn reset(&mut self);
    /// Number of cells with a non-zero count.
    fn populated(&self) -> usize;
}

#[inline]
pub(crate) fn edge<C>(count: u32, threshold: u32, cell: C) -> Vote<C> {
    if threshold > 0 && count == threshold {
        Vote::Peak(cell)
    } else {
        Vote::Pending
    }
}

/// Backing store for a 2D line accumulator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorKind {
    Dense,
    #[default]
    Sparse,
}

/// 2D accumulator picked by [`AccumulatorKind`].
#[derive(Clone, Debug)]
pub enum LineAccumulator {
    Dense(DenseAccumulator),
    Sparse(SparseAccumulator),
}

impl LineAccumulator {
    pub fn new(kind: AccumulatorKind, width: usize, height: usize) -> Result<Self, AccumulatorError> {
        Ok(match kind {
            AccumulatorKind::Dense => LineAccumulator::Dense(DenseAccumulator::new(width, height)?),
            AccumulatorKind::Sparse => {
                LineAccumulator::Sparse(SparseAccumulator::new(width, height)?)
            }
        })
    }

    pub fn kind(&self) -> AccumulatorKind {
        match self {
            LineAccumulator::Dense(_) => AccumulatorKind::Dense,
            LineAccumulator::Sparse(_) => AccumulatorKind::Sparse,
        }
    }
}

impl Accumulator for LineAccumulator {
    type Cell = [usize; 2];

    fn increment(&mut self, cell: [usize; 2]) -> Vote<[usize; 2]> {
        match self {
            LineAccumulator::Dense(a) => a.increment(cell),
            LineAccumulator::Sparse(a) => a.increment(cell),
        }
    }

    fn count(&self, cell: [usize; 2]) -> u32 {
        match self {
            LineAccumulator::Dense(a) => a.count(cell),
            LineAccumulator::Sparse(a) => a.count(cell),
        }
    }

    fn threshold(&self) -> u32 {
        match self {
            LineAccumulator::Dense(a) => a.threshold(),
            LineAccumulator::Sparse(a) => a.threshold(),
        }
    }

    fn set_threshold(&mut self, threshold: u32) {
        match self {
            LineAccumulator::Dense(a) => a.set_threshold(threshold),
            LineAccumulator::Sparse(a) => a.set_threshold(threshold),
        }
    }

    fn reset(&mut self) {
        match self {
            LineAccumulator::Dense(a) => a.reset(),
            LineAccumulator::Sparse(a) => a.reset(),
        }
    }

    fn populated(&self) -> usize {
        match self {
            LineAccumulator::Dense(a) => a.populated(),
            LineAccumulator::Sparse(a) => a.populated(),
        }
    }
}
