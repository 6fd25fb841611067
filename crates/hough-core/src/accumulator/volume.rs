use super::{edge, Accumulator, AccumulatorError, SparseColumn, Vote};

/// 3D accumulator: dense `width × height` grid, sparse along the third axis.
///
/// Used for circles with `(cx, cy)` on the grid and radius in the columns.
#[derive(Clone, Debug)]
pub struct SparseVolume {
    width: usize,
    height: usize,
    depth: usize,
    cells: Vec<SparseColumn>,
    threshold: u32,
}

impl SparseVolume {
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self, AccumulatorError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(AccumulatorError::EmptyDimensions {
                dims: vec![width, height, depth],
            });
        }
        let limit = super::DEFAULT_MAX_CELLS;
        let requested = width.checked_mul(height).unwrap_or(usize::MAX);
        if requested > limit || depth > u32::MAX as usize {
            return Err(AccumulatorError::TooLarge { requested, limit });
        }
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(requested)
            .map_err(|_| AccumulatorError::AllocationFailed { cells: requested })?;
        cells.resize(requested, SparseColumn::new());
        Ok(Self {
            width,
            height,
            depth,
            cells,
            threshold: 0,
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    #[inline]
    fn index(&self, cell: [usize; 3]) -> Option<usize> {
        if cell[0] >= self.width || cell[1] >= self.height || cell[2] >= self.depth {
            return None;
        }
        Some(cell[1] * self.width + cell[0])
    }
}

impl Accumulator for SparseVolume {
    type Cell = [usize; 3];

    fn increment(&mut self, cell: [usize; 3]) -> Vote<[usize; 3]> {
        let Some(idx) = self.index(cell) else {
            return Vote::OutOfRange;
        };
        let count = self.cells[idx].increment(cell[2] as u32);
        edge(count, self.threshold, cell)
    }

    fn count(&self, cell: [usize; 3]) -> u32 {
        self.index(cell)
            .map(|i| self.cells[i].get(cell[2] as u32))
            .unwrap_or(0)
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    fn reset(&mut self) {
        for col in &mut self.cells {
            col.clear();
        }
    }

    fn populated(&self) -> usize {
        self.cells.iter().map(SparseColumn::len).sum()
    }
}
