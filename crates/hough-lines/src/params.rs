use hough_core::{
    AccumulatorKind, LineParameterization, LineRemoval, Origin, Polarity, DEFAULT_MAX_CELLS,
};
use serde::{Deserialize, Serialize};

/// Parameters of the exhaustive (standard) transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardLineParams {
    /// Which side of `threshold` counts as foreground.
    pub polarity: Polarity,
    /// Binarization threshold.
    pub threshold: u8,
    pub origin: Origin,
    pub parameterization: LineParameterization,
    /// Refuse accumulators larger than this many cells.
    pub max_cells: usize,
}

impl Default for StandardLineParams {
    fn default() -> Self {
        Self {
            polarity: Polarity::Dark,
            threshold: 128,
            origin: Origin::CenterYUp,
            parameterization: LineParameterization::Normal,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// Parameters of the randomized transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizedLineParams {
    /// Expected line thickness in pixels; sets the offset bin width.
    pub thickness: f64,
    /// Minimum distance between the two sampled points.
    pub min_separation: f64,
    /// Maximum distance between the two sampled points; `None` allows any
    /// pair inside the frame (twice its largest radius).
    pub max_separation: Option<f64>,
    /// Overrides the `points × threshold × max_shapes / 10` default.
    pub max_iterations: Option<usize>,
    /// Stop once no more than `factor × threshold` points remain.
    pub min_remaining_factor: f64,
    /// Rejection-sampling bound per iteration.
    pub max_sample_attempts: usize,
    /// Removal half-width for a newly accepted line.
    pub narrow_tolerance: f64,
    /// Removal half-width when a line is found again.
    pub wide_tolerance: f64,
    pub removal: LineRemoval,
    pub accumulator: AccumulatorKind,
    pub parameterization: LineParameterization,
}

impl Default for RandomizedLineParams {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            min_separation: 2.0,
            max_separation: None,
            max_iterations: None,
            min_remaining_factor: 1.0,
            max_sample_attempts: 100,
            narrow_tolerance: 1.0,
            wide_tolerance: 3.0,
            removal: LineRemoval::Rasterized,
            accumulator: AccumulatorKind::Sparse,
            parameterization: LineParameterization::Normal,
        }
    }
}

/// Randomized transform on a random subset of the points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilisticLineParams {
    #[serde(flatten)]
    pub randomized: RandomizedLineParams,
    /// Fraction of points kept, in `(0, 1]`.
    pub ratio: f64,
}

impl Default for ProbabilisticLineParams {
    fn default() -> Self {
        Self {
            randomized: RandomizedLineParams::default(),
            ratio: 0.5,
        }
    }
}
