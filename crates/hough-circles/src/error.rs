use hough_core::{AccumulatorError, PointSetError, QuantizationError};

#[derive(thiserror::Error, Debug)]
pub enum CircleDetectError {
    #[error("vote threshold must be at least 1")]
    InvalidThreshold,
    #[error("minimum sample separation must be non-negative and finite (got {0})")]
    InvalidSeparation(f64),
    #[error("detector has no point set; call initialize first")]
    NotInitialized,
    #[error(transparent)]
    Quantization(#[from] QuantizationError),
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
    #[error(transparent)]
    PointSet(#[from] PointSetError),
}
