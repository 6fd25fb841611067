//! Hough-transform shape detection.
//!
//! This crate ties the workspace together:
//! - re-exports of [`core`], [`lines`] and [`circles`];
//! - [`DetectionConfig`], the serde configuration used by the CLI;
//! - (feature `image`) [`detect`], end-to-end helpers over `image::GrayImage`
//!   and a PNG frame-dump observer.
//!
//! ## Quickstart
//!
//! ```no_run
//! use hough_shapes::{detect, DetectionConfig};
//! use hough_shapes::core::seeded_rng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("lines.png")?.to_luma8();
//! let config = DetectionConfig::default();
//! let found = detect::detect_lines_randomized(&img, &config, 50, 10, seeded_rng(7), None)?;
//! for line in &found.lines {
//!     println!("{:?} ({} votes)", line.param, line.votes);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Command line
//!
//! `hough-shapes <image> lines --method randomized --votes 50` prints a JSON
//! report; see `hough-shapes --help`.

pub use hough_circles as circles;
pub use hough_core as core;
pub use hough_lines as lines;

pub use hough_circles::{CircleDetection, DetectedCircle, RandomizedCircleDetector};
pub use hough_core::{Circle, LineParam, NormalLine, Origin, PeakStrategy, PointSet, Polarity};
pub use hough_lines::{
    DetectedLine, LineDetection, ProbabilisticLineDetector, RandomizedLineDetector,
    StandardLineDetector,
};

mod config;

pub use config::{Binarize, ConfigError, DetectionConfig};

#[cfg(feature = "image")]
pub mod detect;
