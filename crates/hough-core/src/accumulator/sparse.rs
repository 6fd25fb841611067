use super::{edge, Accumulator, AccumulatorError, Vote};

/// Sorted `(bin, count)` list along one axis.
///
/// Lookups are a binary search; inserts shift the tail, which stays cheap for
/// the handful of populated bins a randomized detector produces per column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseColumn {
    entries: Vec<(u32, u32)>,
}

impl SparseColumn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one vote to `bin` and return the new count.
    pub fn increment(&mut self, bin: u32) -> u32 {
        match self.entries.binary_search_by_key(&bin, |&(b, _)| b) {
            Ok(i) => {
                let c = &mut self.entries[i].1;
                *c = c.saturating_add(1);
                *c
            }
            Err(i) => {
                self.entries.insert(i, (bin, 1));
                1
            }
        }
    }

    pub fn get(&self, bin: u32) -> u32 {
        self.entries
            .binary_search_by_key(&bin, |&(b, _)| b)
            .map(|i| self.entries[i].1)
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Populated entries in ascending bin order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().copied()
    }
}

/// 2D accumulator with one [`SparseColumn`] per first-axis bin.
#[derive(Clone, Debug)]
pub struct SparseAccumulator {
    columns: Vec<SparseColumn>,
    height: usize,
    threshold: u32,
}

impl SparseAccumulator {
    pub fn new(width: usize, height: usize) -> Result<Self, AccumulatorError> {
        if width == 0 || height == 0 {
            return Err(AccumulatorError::EmptyDimensions {
                dims: vec![width, height],
            });
        }
        if height > u32::MAX as usize {
            return Err(AccumulatorError::TooLarge {
                requested: height,
                limit: u32::MAX as usize,
            });
        }
        Ok(Self {
            columns: vec![SparseColumn::new(); width],
            height,
            threshold: 0,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.columns.len(), self.height)
    }

    pub fn column(&self, b1: usize) -> Option<&SparseColumn> {
        self.columns.get(b1)
    }

    /// Populated cells as `([b1, b2], count)`, column by column.
    pub fn iter(&self) -> impl Iterator<Item = ([usize; 2], u32)> + '_ {
        self.columns.iter().enumerate().flat_map(|(b1, col)| {
            col.iter().map(move |(b2, c)| ([b1, b2 as usize], c))
        })
    }
}

impl Accumulator for SparseAccumulator {
    type Cell = [usize; 2];

    fn increment(&mut self, cell: [usize; 2]) -> Vote<[usize; 2]> {
        if cell[1] >= self.height {
            return Vote::OutOfRange;
        }
        let Some(col) = self.columns.get_mut(cell[0]) else {
            return Vote::OutOfRange;
        };
        let count = col.increment(cell[1] as u32);
        edge(count, self.threshold, cell)
    }

    fn count(&self, cell: [usize; 2]) -> u32 {
        if cell[1] >= self.height {
            return 0;
        }
        self.columns
            .get(cell[0])
            .map(|c| c.get(cell[1] as u32))
            .unwrap_or(0)
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    fn reset(&mut self) {
        for col in &mut self.columns {
            col.clear();
        }
    }

    fn populated(&self) -> usize {
        self.columns.iter().map(SparseColumn::len).sum()
    }
}
