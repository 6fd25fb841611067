//! Peak extraction over a dense 2D accumulator.
//!
//! Every strategy reads the accumulator threshold and works on a private copy
//! of the counts, so extracting twice yields the same peaks.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::accumulator::{Accumulator, DenseAccumulator};
use crate::quantize::ParameterSpace;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeakError {
    #[error("peak strategy `{0}` is not implemented")]
    NotImplemented(&'static str),
}

/// Peak extraction policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeakStrategy {
    /// Take the global maximum, then flood-suppress its plateau.
    ThresholdSuppression {
        /// Neighbours whose count is within this many votes of the peak are
        /// absorbed into it.
        noise_tolerance: u32,
        /// Upper bound on reported peaks.
        max_peaks: usize,
    },
    /// Convolve with a 3×3 line-footprint kernel and keep cells above threshold.
    MatchedFilter,
    LocalMaxima,
    Iterative,
}

impl Default for PeakStrategy {
    fn default() -> Self {
        Self::ThresholdSuppression {
            noise_tolerance: 10,
            max_peaks: 256,
        }
    }
}

/// Accumulator cell reported as a peak.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub bin: [usize; 2],
    /// Parameters at the bin centre.
    pub params: [f64; 2],
    pub votes: u32,
}

pub fn find_peaks<S: ParameterSpace + ?Sized>(
    acc: &DenseAccumulator,
    strategy: &PeakStrategy,
    space: &S,
) -> Result<Vec<Peak>, PeakError> {
    let peaks = match *strategy {
        PeakStrategy::ThresholdSuppression {
            noise_tolerance,
            max_peaks,
        } => threshold_suppression(acc, noise_tolerance, max_peaks, space),
        PeakStrategy::MatchedFilter => matched_filter(acc, space),
        PeakStrategy::LocalMaxima => return Err(PeakError::NotImplemented("local_maxima")),
        PeakStrategy::Iterative => return Err(PeakError::NotImplemented("iterative")),
    };
    debug!(
        "{} peaks above threshold {} ({:?})",
        peaks.len(),
        acc.threshold(),
        strategy
    );
    Ok(peaks)
}

fn threshold_suppression<S: ParameterSpace + ?Sized>(
    acc: &DenseAccumulator,
    noise_tolerance: u32,
    max_peaks: usize,
    space: &S,
) -> Vec<Peak> {
    let (w, h) = acc.dims();
    let threshold = acc.threshold();
    let mut grid = acc.as_slice().to_vec();
    let mut peaks = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    while peaks.len() < max_peaks {
        let mut best_idx = 0usize;
        let mut best = 0u32;
        for (i, &v) in grid.iter().enumerate() {
            if v > best {
                best = v;
                best_idx = i;
            }
        }
        if best <= threshold {
            break;
        }
        let bin = [best_idx % w, best_idx / w];
        peaks.push(Peak {
            bin,
            params: space.reconstruct(bin),
            votes: best,
        });

        grid[best_idx] = 0;
        stack.push(best_idx);
        while let Some(idx) = stack.pop() {
            let (x, y) = ((idx % w) as isize, (idx / w) as isize);
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                        continue;
                    }
                    let n = ny as usize * w + nx as usize;
                    let v = grid[n];
                    if v > 0 && best - v <= noise_tolerance {
                        grid[n] = 0;
                        stack.push(n);
                    }
                }
            }
        }
    }
    peaks
}

/// 3×3 weights for a line crossing the centre cell. The axis with the
/// coarser step spreads fewer votes into its neighbours; corners take the
/// bowtie wings. Sums to one.
fn line_kernel(steps: [f64; 2]) -> [[f64; 3]; 3] {
    let [s1, s2] = steps;
    let total = (s1 + s2).max(f64::EPSILON);
    let along_first = s2 / total;
    let along_second = s1 / total;
    let wing = 0.5 * along_first.min(along_second);
    let mut k = [
        [wing, along_second, wing],
        [along_first, 1.0, along_first],
        [wing, along_second, wing],
    ];
    let sum: f64 = k.iter().flatten().sum();
    for w in k.iter_mut().flatten() {
        *w /= sum;
    }
    k
}

fn matched_filter<S: ParameterSpace + ?Sized>(acc: &DenseAccumulator, space: &S) -> Vec<Peak> {
    let (w, h) = acc.dims();
    let threshold = acc.threshold() as f64;
    let kernel = line_kernel(space.steps());
    let mut peaks = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let mut v = 0.0;
            for (ky, row) in kernel.iter().enumerate() {
                let sy = y as isize + ky as isize - 1;
                if sy < 0 || sy >= h as isize {
                    continue;
                }
                for (kx, &weight) in row.iter().enumerate() {
                    let sx = x as isize + kx as isize - 1;
                    if sx < 0 || sx >= w as isize {
                        continue;
                    }
                    v += weight * acc.get_flat(sy as usize * w + sx as usize) as f64;
                }
            }
            if v > threshold {
                let bin = [x, y];
                peaks.push(Peak {
                    bin,
                    params: space.reconstruct(bin),
                    votes: acc.count(bin),
                });
            }
        }
    }
    peaks
}
