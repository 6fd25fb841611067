//! Shared building blocks for Hough-transform shape detection.
//!
//! Images become [`PointSet`]s in a chosen [`Frame`]; line and circle
//! parameters are quantized by [`LineQuantization`] / [`CircleQuantization`]
//! and voted into an [`Accumulator`]. Dense grids feed [`find_peaks`].
//! The detectors themselves live in `hough-lines` and `hough-circles`.

mod accumulator;
mod control;
mod frame;
mod geometry;
mod image;
mod logger;
mod observer;
mod peaks;
mod point_set;
mod quantize;
mod sampling;

pub use accumulator::{
    Accumulator, AccumulatorError, AccumulatorKind, DenseAccumulator, LineAccumulator,
    SparseAccumulator, SparseColumn, SparseVolume, Vote, DEFAULT_MAX_CELLS,
};
pub use control::{CancelToken, DetectorState, Termination};
pub use frame::{Frame, FrameError, Origin};
pub use geometry::{
    circumcircle, frame_intersection, intersect_lines, raster_segment, to_f64, Circle,
    LineParam, NormalLine, SlopeLine,
};
pub use image::{GrayImage, GrayImageView, ImageError, Polarity};
pub use observer::{DetectionObserver, PeakEvent, PeakOutcome};
pub use peaks::{find_peaks, Peak, PeakError, PeakStrategy};
pub use point_set::{LineRemoval, PointSet, PointSetError};
pub use quantize::{
    AxisDirection, AxisQuantizer, CircleQuantization, LineParameterization, LineQuantization,
    ParameterSpace, QuantizationError, VoteKernel,
};
pub use sampling::{default_rng, seeded_rng, UniformSource};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::Point2;
