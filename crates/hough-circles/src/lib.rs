//! Circle detection with the randomized Hough transform.
//!
//! Triples of points vote for their circumcircle in a `(cx, cy, r)`
//! accumulator; a cell reaching the threshold is reported and the points on
//! its outline are removed.

mod detector;
mod error;
mod params;

pub use detector::{CircleObserver, RandomizedCircleDetector};
pub use error::CircleDetectError;
pub use params::RandomizedCircleParams;

use hough_core::{Circle, Termination};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedCircle {
    /// Bin-centre circle.
    pub circle: Circle,
    pub votes: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleDetection {
    pub circles: Vec<DetectedCircle>,
    pub iterations: usize,
    pub termination: Termination,
}
