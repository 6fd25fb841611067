use super::{edge, Accumulator, AccumulatorError, Vote};
use crate::image::GrayImage;
use crate::peaks::{find_peaks, Peak, PeakError, PeakStrategy};
use crate::quantize::ParameterSpace;

/// Default ceiling on dense allocations (256 Mi cells, 1 GiB of counts).
pub const DEFAULT_MAX_CELLS: usize = 1 << 28;

/// Fully allocated 2D vote grid.
///
/// Cell `[b1, b2]` is stored at `b2 * width + b1`, so exporting the grid as an
/// image puts the first axis on columns and the second axis on rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseAccumulator {
    width: usize,
    height: usize,
    cells: Vec<u32>,
    threshold: u32,
}

impl DenseAccumulator {
    pub fn new(width: usize, height: usize) -> Result<Self, AccumulatorError> {
        Self::with_limit(width, height, DEFAULT_MAX_CELLS)
    }

    /// Allocate, failing fast instead of truncating when the grid is too big.
    pub fn with_limit(width: usize, height: usize, limit: usize) -> Result<Self, AccumulatorError> {
        if width == 0 || height == 0 {
            return Err(AccumulatorError::EmptyDimensions {
                dims: vec![width, height],
            });
        }
        let requested = width
            .checked_mul(height)
            .ok_or(AccumulatorError::TooLarge {
                requested: usize::MAX,
                limit,
            })?;
        if requested > limit {
            return Err(AccumulatorError::TooLarge { requested, limit });
        }
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(requested)
            .map_err(|_| AccumulatorError::AllocationFailed { cells: requested })?;
        cells.resize(requested, 0);
        Ok(Self {
            width,
            height,
            cells,
            threshold: 0,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.cells
    }

    #[inline]
    fn index(&self, cell: [usize; 2]) -> Option<usize> {
        if cell[0] >= self.width || cell[1] >= self.height {
            return None;
        }
        Some(cell[1] * self.width + cell[0])
    }

    #[inline]
    pub(crate) fn get_flat(&self, idx: usize) -> u32 {
        self.cells[idx]
    }

    pub fn max_count(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Rescale counts into `[0, 255]`, zero votes brightest.
    pub fn to_image(&self) -> GrayImage {
        let max = self.max_count();
        let data = if max == 0 {
            vec![255u8; self.cells.len()]
        } else {
            self.cells
                .iter()
                .map(|&c| 255 - ((c as u64 * 255) / max as u64) as u8)
                .collect()
        };
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Extract peaks above the current threshold.
    pub fn find_peaks<S: ParameterSpace + ?Sized>(
        &self,
        strategy: &PeakStrategy,
        space: &S,
    ) -> Result<Vec<Peak>, PeakError> {
        find_peaks(self, strategy, space)
    }
}

impl Accumulator for DenseAccumulator {
    type Cell = [usize; 2];

    #[inline]
    fn increment(&mut self, cell: [usize; 2]) -> Vote<[usize; 2]> {
        let Some(idx) = self.index(cell) else {
            return Vote::OutOfRange;
        };
        let c = &mut self.cells[idx];
        *c = c.saturating_add(1);
        edge(*c, self.threshold, cell)
    }

    #[inline]
    fn count(&self, cell: [usize; 2]) -> u32 {
        self.index(cell).map(|i| self.cells[i]).unwrap_or(0)
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    fn reset(&mut self) {
        self.cells.fill(0);
    }

    fn populated(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_fires_once_at_threshold() {
        let mut acc = DenseAccumulator::new(4, 4).unwrap();
        acc.set_threshold(3);
        assert_eq!(acc.increment([2, 1]), Vote::Pending);
        assert_eq!(acc.increment([2, 1]), Vote::Pending);
        assert_eq!(acc.increment([2, 1]), Vote::Peak([2, 1]));
        assert_eq!(acc.increment([2, 1]), Vote::Pending);
        assert_eq!(acc.count([2, 1]), 4);
    }

    #[test]
    fn zero_threshold_never_fires() {
        let mut acc = DenseAccumulator::new(2, 2).unwrap();
        for _ in 0..5 {
            assert_eq!(acc.increment([0, 0]), Vote::Pending);
        }
    }

    #[test]
    fn oversized_requests_fail_fast() {
        assert_eq!(
            DenseAccumulator::with_limit(1000, 1000, 10_000),
            Err(AccumulatorError::TooLarge {
                requested: 1_000_000,
                limit: 10_000
            })
        );
        assert!(matches!(
            DenseAccumulator::new(usize::MAX, 2),
            Err(AccumulatorError::TooLarge { .. })
        ));
        assert!(matches!(
            DenseAccumulator::new(0, 2),
            Err(AccumulatorError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn image_export_inverts_counts() {
        let mut acc = DenseAccumulator::new(3, 1).unwrap();
        acc.increment([1, 0]);
        acc.increment([2, 0]);
        acc.increment([2, 0]);
        let img = acc.to_image();
        assert_eq!(img.data, vec![255, 128, 0]);

        acc.reset();
        assert_eq!(acc.to_image().data, vec![255, 255, 255]);
    }
}
