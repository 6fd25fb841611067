use hough_core::{LineParam, NormalLine, Termination};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedLine {
    /// Bin-centre parameters in the accumulator's parameterization.
    pub param: LineParam,
    /// Votes in the cell when it was reported.
    pub votes: u32,
}

impl DetectedLine {
    pub fn normal(&self) -> NormalLine {
        self.param.to_normal()
    }
}

/// Result of one randomized run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineDetection {
    pub lines: Vec<DetectedLine>,
    pub iterations: usize,
    pub termination: Termination,
}
