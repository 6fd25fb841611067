use std::collections::HashSet;

use hough_core::{
    circumcircle, default_rng, to_f64, Accumulator, CancelToken, CircleQuantization,
    DetectionObserver, DetectorState, PeakEvent, PeakOutcome, Point2, PointSet, SparseVolume,
    Termination, UniformSource,
};
use log::{debug, info};
use rand::rngs::StdRng;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{CircleDetectError, CircleDetection, DetectedCircle, RandomizedCircleParams};

pub type CircleObserver = Box<dyn DetectionObserver<DetectedCircle>>;

struct Session {
    points: PointSet,
    quantization: CircleQuantization,
    accumulator: SparseVolume,
    recorded: HashSet<[usize; 3]>,
}

/// Randomized circle detector.
///
/// Each iteration samples three well-separated points and votes for their
/// circumcircle. Collinear triples have no circumcircle and circles whose
/// centre leaves the frame or whose radius exceeds the frame diagonal are
/// never voted.
pub struct RandomizedCircleDetector<R = StdRng> {
    params: RandomizedCircleParams,
    rng: R,
    state: DetectorState,
    session: Option<Session>,
    observer: Option<CircleObserver>,
    cancel: Option<CancelToken>,
}

impl RandomizedCircleDetector<StdRng> {
    pub fn new(params: RandomizedCircleParams) -> Self {
        Self::with_rng(params, default_rng())
    }
}

impl<R: UniformSource> RandomizedCircleDetector<R> {
    pub fn with_rng(params: RandomizedCircleParams, rng: R) -> Self {
        Self {
            params,
            rng,
            state: DetectorState::Idle,
            session: None,
            observer: None,
            cancel: None,
        }
    }

    pub fn with_observer(mut self, observer: CircleObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<CircleObserver>) {
        self.observer = observer;
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &RandomizedCircleParams {
        &self.params
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn points(&self) -> Option<&PointSet> {
        self.session.as_ref().map(|s| &s.points)
    }

    pub fn into_points(self) -> Option<PointSet> {
        self.session.map(|s| s.points)
    }

    pub fn quantization(&self) -> Option<&CircleQuantization> {
        self.session.as_ref().map(|s| &s.quantization)
    }

    pub fn initialize(&mut self, points: PointSet) -> Result<(), CircleDetectError> {
        let sep = self.params.min_separation;
        if !(sep >= 0.0 && sep.is_finite()) {
            return Err(CircleDetectError::InvalidSeparation(sep));
        }
        let quantization = CircleQuantization::for_frame(points.frame(), self.params.thickness)?;
        let (w, h, d) = quantization.dims();
        let accumulator = SparseVolume::new(w, h, d)?;
        debug!(
            "initialized with {} points, {}x{}x{} volume",
            points.len(),
            w,
            h,
            d
        );
        self.session = Some(Session {
            points,
            quantization,
            accumulator,
            recorded: HashSet::new(),
        });
        self.state = DetectorState::Initialized;
        Ok(())
    }

    /// Detect up to `max_shapes` circles with at least `threshold` votes.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn run(&mut self, threshold: u32) -> Result<CircleDetection, CircleDetectError> {
        if threshold == 0 {
            return Err(CircleDetectError::InvalidThreshold);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(CircleDetectError::NotInitialized);
        };
        self.state = DetectorState::Running;

        let params = &self.params;
        let max_iterations = params.max_iterations.unwrap_or_else(|| {
            session
                .points
                .len()
                .saturating_mul(threshold as usize)
                .max(1)
        });
        let min_remaining = params.min_remaining_factor * threshold as f64;

        session.accumulator.reset();
        session.accumulator.set_threshold(threshold);

        let mut circles = Vec::new();
        let mut iterations = 0usize;
        let termination = loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                break Termination::Cancelled;
            }
            if iterations >= max_iterations {
                break Termination::IterationLimit;
            }
            if circles.len() >= params.max_shapes {
                break Termination::ShapeLimit;
            }
            let remaining = session.points.len();
            if remaining < 3 || remaining as f64 <= min_remaining {
                break Termination::PointsExhausted;
            }
            iterations += 1;

            let Some(idx) = sample_triple(
                session.points.as_slice(),
                &mut self.rng,
                params.min_separation,
                params.max_sample_attempts,
            ) else {
                break Termination::SamplingFailed;
            };
            let [a, b, c] = idx.map(|i| to_f64(session.points.as_slice()[i]));
            let Some(circle) = circumcircle(a, b, c) else {
                continue;
            };
            let Some(cell) = session.quantization.discretize(&circle) else {
                continue;
            };
            let Some(cell) = session.accumulator.increment(cell).peak() else {
                continue;
            };

            let detected = DetectedCircle {
                circle: session.quantization.circle_at(cell),
                votes: session.accumulator.count(cell),
            };
            let (outcome, tolerance) = if session.recorded.insert(cell) {
                (PeakOutcome::Accepted, params.narrow_tolerance)
            } else {
                (PeakOutcome::Duplicate, params.wide_tolerance)
            };
            let mut removed = session.points.remove_near_circle(
                detected.circle.center,
                detected.circle.radius,
                tolerance,
            );
            if removed == 0 {
                let mut idx = idx;
                idx.sort_unstable_by(|x, y| y.cmp(x));
                for i in idx {
                    session.points.remove_at(i);
                }
                removed = 3;
            }
            session.accumulator.reset();
            debug!(
                "iteration {iterations}: {outcome:?} circle ({:.1}, {:.1}) r={:.1}, removed {removed}, {} left",
                detected.circle.center.x,
                detected.circle.center.y,
                detected.circle.radius,
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
                circles.push(detected);
            }
        };

        self.state = DetectorState::Done;
        info!(
            "found {} circles in {} iterations ({:?}), {} points left",
            circles.len(),
            iterations,
            termination,
            session.points.len()
        );
        Ok(CircleDetection {
            circles,
            iterations,
            termination,
        })
    }
}

/// Three distinct indices whose points are pairwise at least `min_sep` apart.
fn sample_triple<R: UniformSource + ?Sized>(
    points: &[Point2<i32>],
    rng: &mut R,
    min_sep: f64,
    attempts: usize,
) -> Option<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let far = |i: usize, j: usize| (to_f64(points[i]) - to_f64(points[j])).norm() >= min_sep;
    for _ in 0..attempts {
        let (i, j, k) = (rng.next_index(n), rng.next_index(n), rng.next_index(n));
        if i == j || j == k || i == k {
            continue;
        }
        if far(i, j) && far(j, k) && far(i, k) {
            return Some([i, j, k]);
        }
    }
    None
}
