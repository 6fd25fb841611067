//! Randomized Hough transform for lines.
//!
//! Instead of every point voting for every angle, pairs of points are sampled
//! and vote for the single line through them. A cell reaching the threshold
//! becomes a line; the points it explains are removed and the accumulator is
//! cleared before sampling resumes.

use std::collections::HashSet;

use hough_core::{
    default_rng, to_f64, Accumulator, CancelToken, DetectionObserver, DetectorState,
    LineAccumulator, LineQuantization, NormalLine, PeakEvent, PeakOutcome, Point2, PointSet,
    Termination, UniformSource,
};
use log::{debug, info};
use rand::rngs::StdRng;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DetectedLine, LineDetectError, LineDetection, RandomizedLineParams};

pub type LineObserver = Box<dyn DetectionObserver<DetectedLine>>;

struct Session {
    points: PointSet,
    quantization: LineQuantization,
    accumulator: LineAccumulator,
    /// Largest pair distance sampled, `2 × max_radius` unless configured.
    max_separation: f64,
    /// Cells already reported; survives across `run` calls.
    recorded: HashSet<[usize; 2]>,
}

pub struct RandomizedLineDetector<R = StdRng> {
    params: RandomizedLineParams,
    rng: R,
    state: DetectorState,
    session: Option<Session>,
    observer: Option<LineObserver>,
    cancel: Option<CancelToken>,
}

impl RandomizedLineDetector<StdRng> {
    /// Detector with a clock-seeded generator.
    pub fn new(params: RandomizedLineParams) -> Self {
        Self::with_rng(params, default_rng())
    }
}

impl<R: UniformSource> RandomizedLineDetector<R> {
    pub fn with_rng(params: RandomizedLineParams, rng: R) -> Self {
        Self {
            params,
            rng,
            state: DetectorState::Idle,
            session: None,
            observer: None,
            cancel: None,
        }
    }

    pub fn with_observer(mut self, observer: LineObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<LineObserver>) {
        self.observer = observer;
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &RandomizedLineParams {
        &self.params
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Points not yet explained by a detected line.
    pub fn points(&self) -> Option<&PointSet> {
        self.session.as_ref().map(|s| &s.points)
    }

    /// Consume the detector, handing back the remaining points.
    pub fn into_points(self) -> Option<PointSet> {
        self.session.map(|s| s.points)
    }

    pub fn quantization(&self) -> Option<&LineQuantization> {
        self.session.as_ref().map(|s| &s.quantization)
    }

    /// Pair separation bound in effect after `initialize`.
    pub fn max_separation(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.max_separation)
    }

    /// Take ownership of `points` and size the accumulator for their frame.
    ///
    /// Clears lines recorded by earlier runs.
    pub fn initialize(&mut self, points: PointSet) -> Result<(), LineDetectError> {
        let p = &self.params;
        let max_sep = p
            .max_separation
            .unwrap_or_else(|| 2.0 * points.frame().max_radius());
        if !(p.min_separation >= 0.0 && max_sep >= p.min_separation) {
            return Err(LineDetectError::InvalidSeparation {
                min: p.min_separation,
                max: max_sep,
            });
        }
        let quantization =
            LineQuantization::for_frame(points.frame(), p.thickness, p.parameterization)?;
        let (w, h) = quantization.dims();
        let accumulator = LineAccumulator::new(p.accumulator, w, h)?;
        debug!(
            "initialized with {} points, {}x{} {:?} accumulator",
            points.len(),
            w,
            h,
            accumulator.kind()
        );
        self.session = Some(Session {
            points,
            quantization,
            accumulator,
            max_separation: max_sep,
            recorded: HashSet::new(),
        });
        self.state = DetectorState::Initialized;
        Ok(())
    }

    /// Sample, vote and extract up to `max_shapes` new lines.
    ///
    /// Calling `run` again continues on the remaining points; cells reported
    /// by an earlier run are treated as duplicates.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn run(
        &mut self,
        hs_threshold: u32,
        max_shapes: usize,
    ) -> Result<LineDetection, LineDetectError> {
        if hs_threshold == 0 {
            return Err(LineDetectError::InvalidThreshold);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(LineDetectError::NotInitialized);
        };
        self.state = DetectorState::Running;

        let params = &self.params;
        let max_iterations = params.max_iterations.unwrap_or_else(|| {
            (session
                .points
                .len()
                .saturating_mul(hs_threshold as usize)
                .saturating_mul(max_shapes)
                / 10)
                .max(1)
        });
        let min_remaining = params.min_remaining_factor * hs_threshold as f64;

        session.accumulator.reset();
        session.accumulator.set_threshold(hs_threshold);

        let mut lines = Vec::new();
        let mut iterations = 0usize;
        let termination = loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                break Termination::Cancelled;
            }
            if iterations >= max_iterations {
                break Termination::IterationLimit;
            }
            if lines.len() >= max_shapes {
                break Termination::ShapeLimit;
            }
            let remaining = session.points.len();
            if remaining < 2 || remaining as f64 <= min_remaining {
                break Termination::PointsExhausted;
            }
            iterations += 1;

            let Some((i, j)) = sample_pair(
                session.points.as_slice(),
                &mut self.rng,
                params.min_separation,
                session.max_separation,
                params.max_sample_attempts,
            ) else {
                break Termination::SamplingFailed;
            };
            let p = session.points.as_slice()[i];
            let q = session.points.as_slice()[j];
            let Some(line) = NormalLine::through(to_f64(p), to_f64(q)) else {
                continue;
            };
            let Some(cell) = session.quantization.discretize(&line) else {
                continue;
            };
            let Some(cell) = session.accumulator.increment(cell).peak() else {
                continue;
            };

            let detected = DetectedLine {
                param: session.quantization.line_at(cell),
                votes: session.accumulator.count(cell),
            };
            let normal = detected.normal();
            let (outcome, tolerance) = if session.recorded.insert(cell) {
                (PeakOutcome::Accepted, params.narrow_tolerance)
            } else {
                (PeakOutcome::Duplicate, params.wide_tolerance)
            };
            let mut removed = session
                .points
                .remove_along_line(&normal, tolerance, params.removal);
            if removed == 0 {
                // Pair indices are still valid: nothing moved.
                session.points.remove_at(i.max(j));
                session.points.remove_at(i.min(j));
                removed = 2;
            }
            session.accumulator.reset();
            let [a, b] = detected.param.as_pair();
            debug!(
                "iteration {iterations}: {outcome:?} line ({a:.4}, {b:.2}), removed {removed}, {} left",
                session.points.len()
            );
            if let Some(obs) = self.observer.as_mut() {
                obs.on_peak(&PeakEvent {
                    iteration: iterations,
                    outcome,
                    shape: &detected,
                    remaining: &session.points,
                });
            }
            if outcome == PeakOutcome::Accepted {
                lines.push(detected);
            }
        };

        self.state = DetectorState::Done;
        info!(
            "found {} lines in {} iterations ({:?}), {} points left",
            lines.len(),
            iterations,
            termination,
            session.points.len()
        );
        Ok(LineDetection {
            lines,
            iterations,
            termination,
        })
    }
}

/// Two distinct indices whose points are `min_sep..=max_sep` apart, or `None`
/// after `attempts` rejected draws.
fn sample_pair<R: UniformSource + ?Sized>(
    points: &[Point2<i32>],
    rng: &mut R,
    min_sep: f64,
    max_sep: f64,
    attempts: usize,
) -> Option<(usize, usize)> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    for _ in 0..attempts {
        let i = rng.next_index(n);
        let j = rng.next_index(n);
        if i == j {
            continue;
        }
        let d = (to_f64(points[i]) - to_f64(points[j])).norm();
        if d >= min_sep && d <= max_sep {
            return Some((i, j));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hough_core::{seeded_rng, Origin};

    #[test]
    fn run_requires_initialize() {
        let mut det =
            RandomizedLineDetector::with_rng(RandomizedLineParams::default(), seeded_rng(1));
        assert_eq!(det.state(), DetectorState::Idle);
        assert!(matches!(
            det.run(10, 1),
            Err(LineDetectError::NotInitialized)
        ));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut det =
            RandomizedLineDetector::with_rng(RandomizedLineParams::default(), seeded_rng(1));
        det.initialize(PointSet::new(10, 10, Origin::TopLeft).unwrap())
            .unwrap();
        assert!(matches!(det.run(0, 1), Err(LineDetectError::InvalidThreshold)));
    }

    #[test]
    fn inverted_separation_is_rejected() {
        let params = RandomizedLineParams {
            min_separation: 5.0,
            max_separation: Some(2.0),
            ..Default::default()
        };
        let mut det = RandomizedLineDetector::with_rng(params, seeded_rng(1));
        let err = det
            .initialize(PointSet::new(10, 10, Origin::TopLeft).unwrap())
            .unwrap_err();
        assert!(matches!(err, LineDetectError::InvalidSeparation { .. }));
    }

    #[test]
    fn unreachable_separation_stops_sampling() {
        let mut points = PointSet::new(20, 20, Origin::TopLeft).unwrap();
        for x in 0..5 {
            points.add(Point2::new(x, 0));
        }
        let params = RandomizedLineParams {
            min_separation: 50.0,
            min_remaining_factor: 0.0,
            ..Default::default()
        };
        let mut det = RandomizedLineDetector::with_rng(params, seeded_rng(3));
        det.initialize(points).unwrap();
        let res = det.run(2, 1).unwrap();
        assert_eq!(res.termination, Termination::SamplingFailed);
        assert_eq!(res.iterations, 1);
        assert!(res.lines.is_empty());
        assert_eq!(det.state(), DetectorState::Done);
    }

    #[test]
    fn sampled_pairs_respect_separation() {
        let pts: Vec<_> = (0..30).map(|x| Point2::new(x, 0)).collect();
        let mut rng = seeded_rng(9);
        for _ in 0..100 {
            let (i, j) = sample_pair(&pts, &mut rng, 3.0, 6.0, 1000).unwrap();
            let d = (pts[i].x - pts[j].x).abs();
            assert!((3..=6).contains(&d), "distance {d}");
        }
    }
}
