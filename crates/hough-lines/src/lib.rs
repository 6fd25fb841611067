//! Straight-line detection with Hough transforms.
//!
//! - [`StandardLineDetector`]: every foreground pixel votes for every angle
//!   bin of a dense accumulator; peaks are read with a [`PeakStrategy`].
//! - [`RandomizedLineDetector`]: point pairs vote for the line through them;
//!   lines are reported as soon as a cell reaches the threshold.
//! - [`ProbabilisticLineDetector`]: the randomized detector on a random
//!   subset of the points.
//!
//! ```no_run
//! use hough_lines::{RandomizedLineDetector, RandomizedLineParams};
//! use hough_core::{seeded_rng, GrayImage, Origin, PointSet, Polarity};
//!
//! let image = GrayImage::filled(100, 100, 255);
//! let points = PointSet::from_image(&image.view(), Polarity::Dark, 128, Origin::CenterYUp)?;
//! let mut det = RandomizedLineDetector::with_rng(RandomizedLineParams::default(), seeded_rng(7));
//! det.initialize(points)?;
//! let found = det.run(50, 5)?;
//! println!("{} lines", found.lines.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`PeakStrategy`]: hough_core::PeakStrategy

mod error;
mod params;
mod probabilistic;
mod randomized;
mod standard;
mod types;

pub use error::LineDetectError;
pub use params::{ProbabilisticLineParams, RandomizedLineParams, StandardLineParams};
pub use probabilistic::ProbabilisticLineDetector;
pub use randomized::{LineObserver, RandomizedLineDetector};
pub use standard::StandardLineDetector;
pub use types::{DetectedLine, LineDetection};

pub use hough_core::DetectorState;
