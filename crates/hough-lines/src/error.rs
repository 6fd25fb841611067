use hough_core::{AccumulatorError, PeakError, PointSetError, QuantizationError};

#[derive(thiserror::Error, Debug)]
pub enum LineDetectError {
    #[error("vote threshold must be at least 1")]
    InvalidThreshold,
    #[error("invalid sample separation range [{min}, {max}]")]
    InvalidSeparation { min: f64, max: f64 },
    #[error("detector has no data; initialize or run it first")]
    NotInitialized,
    #[error(transparent)]
    Quantization(#[from] QuantizationError),
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
    #[error(transparent)]
    PointSet(#[from] PointSetError),
    #[error(transparent)]
    Peak(#[from] PeakError),
}
