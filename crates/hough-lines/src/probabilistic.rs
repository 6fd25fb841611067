//! Probabilistic variant: the randomized transform on a random subset.

use hough_core::{default_rng, CancelToken, DetectorState, PointSet, UniformSource};
use log::debug;
use rand::rngs::StdRng;

use crate::randomized::LineObserver;
use crate::{LineDetectError, LineDetection, ProbabilisticLineParams, RandomizedLineDetector};

pub struct ProbabilisticLineDetector<R = StdRng> {
    ratio: f64,
    inner: RandomizedLineDetector<R>,
}

impl ProbabilisticLineDetector<StdRng> {
    pub fn new(params: ProbabilisticLineParams) -> Self {
        Self::with_rng(params, default_rng())
    }
}

impl<R: UniformSource> ProbabilisticLineDetector<R> {
    pub fn with_rng(params: ProbabilisticLineParams, rng: R) -> Self {
        Self {
            ratio: params.ratio,
            inner: RandomizedLineDetector::with_rng(params.randomized, rng),
        }
    }

    pub fn with_observer(self, observer: LineObserver) -> Self {
        Self {
            ratio: self.ratio,
            inner: self.inner.with_observer(observer),
        }
    }

    pub fn with_cancel(self, token: CancelToken) -> Self {
        Self {
            ratio: self.ratio,
            inner: self.inner.with_cancel(token),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Keep about `ratio` of `points` (all of them if the ratio is outside
    /// `(0, 1]`), then initialize the randomized detector.
    pub fn initialize(&mut self, mut points: PointSet) -> Result<(), LineDetectError> {
        let before = points.len();
        let dropped = points.subsample(self.ratio, self.inner.rng_mut());
        debug!("kept {} of {} points", before - dropped, before);
        self.inner.initialize(points)
    }

    pub fn run(
        &mut self,
        hs_threshold: u32,
        max_shapes: usize,
    ) -> Result<LineDetection, LineDetectError> {
        self.inner.run(hs_threshold, max_shapes)
    }

    pub fn state(&self) -> DetectorState {
        self.inner.state()
    }

    pub fn points(&self) -> Option<&PointSet> {
        self.inner.points()
    }

    pub fn into_points(self) -> Option<PointSet> {
        self.inner.into_points()
    }

    pub fn inner(&self) -> &RandomizedLineDetector<R> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hough_core::{seeded_rng, Origin, Point2};

    fn grid_points(n: i32) -> PointSet {
        let mut set = PointSet::new(64, 64, Origin::TopLeft).unwrap();
        for y in 0..n {
            for x in 0..n {
                set.add(Point2::new(x, y));
            }
        }
        set
    }

    #[test]
    fn subsamples_before_initialize() {
        let params = ProbabilisticLineParams {
            ratio: 0.25,
            ..Default::default()
        };
        let mut det = ProbabilisticLineDetector::with_rng(params, seeded_rng(5));
        det.initialize(grid_points(20)).unwrap();
        assert_eq!(det.points().unwrap().len(), 100);
        assert_eq!(det.state(), DetectorState::Initialized);
    }

    #[test]
    fn out_of_range_ratio_keeps_everything() {
        for ratio in [0.0, 1.5, f64::NAN] {
            let params = ProbabilisticLineParams {
                ratio,
                ..Default::default()
            };
            let mut det = ProbabilisticLineDetector::with_rng(params, seeded_rng(5));
            det.initialize(grid_points(10)).unwrap();
            assert_eq!(det.points().unwrap().len(), 100);
        }
    }
}
