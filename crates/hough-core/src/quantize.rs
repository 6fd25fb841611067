//! Continuous parameter ranges ↔ integer accumulator bins.
//!
//! Each axis maps `value → bin = round(offset ± value / step)` and back with
//! `value = ±(bin − offset) · step`. The sign is per axis: the angle axis
//! grows with the bin index, offset axes (rho, intercept, circle y) shrink,
//! which matches the row order of an image with Y pointing down.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::frame::Frame;
use crate::geometry::{Circle, LineParam, NormalLine, SlopeLine};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QuantizationError {
    #[error("shape thickness must be positive and finite (got {0})")]
    InvalidThickness(f64),
    #[error("slope range must be positive and finite (got {0})")]
    InvalidSlopeRange(f64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    Increasing,
    Decreasing,
}

/// One quantized parameter axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisQuantizer {
    pub min: f64,
    pub max: f64,
    pub n_bins: usize,
    pub offset: f64,
    pub step: f64,
    pub direction: AxisDirection,
}

impl AxisQuantizer {
    /// Axis covering `[min, max]` with bins `step` apart; bin 0 sits at `min`
    /// for increasing axes and at `max` for decreasing ones.
    pub fn spanning(min: f64, max: f64, step: f64, direction: AxisDirection) -> Self {
        let n_bins = ((max - min) / step).ceil().max(0.0) as usize + 1;
        let span_max = min + (n_bins - 1) as f64 * step;
        let (min, max) = match direction {
            AxisDirection::Increasing => (min, span_max),
            AxisDirection::Decreasing => (max - (n_bins - 1) as f64 * step, max),
        };
        let offset = match direction {
            AxisDirection::Increasing => -min / step,
            AxisDirection::Decreasing => max / step,
        };
        Self {
            min,
            max,
            n_bins,
            offset,
            step,
            direction,
        }
    }

    /// Symmetric axis over `[-half_range, half_range]` with an exact centre bin.
    pub fn centered(half_range: f64, step: f64, direction: AxisDirection) -> Self {
        let n_half = (half_range / step).ceil().max(0.0);
        let reach = n_half * step;
        Self {
            min: -reach,
            max: reach,
            n_bins: 2 * n_half as usize + 1,
            offset: n_half,
            step,
            direction,
        }
    }

    /// Angle axis over a half turn, `n_bins` bins, bin 0 at angle 0.
    ///
    /// Angles in `[-step/2, π - step/2)` land on a valid bin.
    pub fn half_turn(n_bins: usize) -> Self {
        let n_bins = n_bins.max(1);
        let step = PI / n_bins as f64;
        Self {
            min: 0.0,
            max: PI - step,
            n_bins,
            offset: 0.0,
            step,
            direction: AxisDirection::Increasing,
        }
    }

    /// Bin for `value`, `None` outside the axis.
    #[inline]
    pub fn discretize(&self, value: f64) -> Option<usize> {
        let f = match self.direction {
            AxisDirection::Increasing => self.offset + value / self.step,
            AxisDirection::Decreasing => self.offset - value / self.step,
        };
        let bin = f.round();
        if !bin.is_finite() || bin < 0.0 || bin >= self.n_bins as f64 {
            return None;
        }
        Some(bin as usize)
    }

    /// Centre value of `bin`.
    #[inline]
    pub fn reconstruct(&self, bin: usize) -> f64 {
        let k = bin as f64 - self.offset;
        match self.direction {
            AxisDirection::Increasing => k * self.step,
            AxisDirection::Decreasing => -k * self.step,
        }
    }
}

/// Two-axis parameter space as seen by peak extraction.
pub trait ParameterSpace {
    /// Real parameters at the centre of `bin`.
    fn reconstruct(&self, bin: [usize; 2]) -> [f64; 2];
    /// Bin widths of both axes.
    fn steps(&self) -> [f64; 2];
}

/// Line parameterization used by the accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineParameterization {
    /// `(theta, rho)` normal form; every line is representable.
    #[default]
    Normal,
    /// `(slope, intercept)`; lines steeper than `max_slope` are not voted.
    Slope { max_slope: f64 },
}

/// Quantized line parameter space for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineQuantization {
    pub parameterization: LineParameterization,
    pub first: AxisQuantizer,
    pub second: AxisQuantizer,
}

impl LineQuantization {
    /// Bin widths follow the expected line thickness: the offset axis uses
    /// `thickness` (at least one pixel), the angle axis the angle that moves a
    /// line by one offset bin at the frame border.
    pub fn for_frame(
        frame: &Frame,
        thickness: f64,
        parameterization: LineParameterization,
    ) -> Result<Self, QuantizationError> {
        if !(thickness > 0.0 && thickness.is_finite()) {
            return Err(QuantizationError::InvalidThickness(thickness));
        }
        let offset_step = thickness.max(1.0);
        match parameterization {
            LineParameterization::Normal => {
                let diag = frame.diagonal().max(1.0);
                let theta_step = 2.0 * (offset_step / diag).atan();
                let n_theta = (PI / theta_step).ceil() as usize;
                Ok(Self {
                    parameterization,
                    first: AxisQuantizer::half_turn(n_theta),
                    second: AxisQuantizer::centered(
                        frame.max_radius(),
                        offset_step,
                        AxisDirection::Decreasing,
                    ),
                })
            }
            LineParameterization::Slope { max_slope } => {
                if !(max_slope > 0.0 && max_slope.is_finite()) {
                    return Err(QuantizationError::InvalidSlopeRange(max_slope));
                }
                let (max_x, max_y) = frame.max_abs();
                let slope_step = offset_step / max_x.max(1.0);
                Ok(Self {
                    parameterization,
                    first: AxisQuantizer::centered(
                        max_slope,
                        slope_step,
                        AxisDirection::Increasing,
                    ),
                    second: AxisQuantizer::centered(
                        max_y + max_slope * max_x,
                        offset_step,
                        AxisDirection::Decreasing,
                    ),
                })
            }
        }
    }

    /// Accumulator size `(first-axis bins, second-axis bins)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.first.n_bins, self.second.n_bins)
    }

    /// Bins of a line, `None` when it falls outside the space.
    pub fn discretize(&self, line: &NormalLine) -> Option<[usize; 2]> {
        match self.parameterization {
            LineParameterization::Normal => {
                let l = line.normalized(-0.5 * self.first.step);
                Some([
                    self.first.discretize(l.theta)?,
                    self.second.discretize(l.rho)?,
                ])
            }
            LineParameterization::Slope { .. } => {
                let s = line.to_slope()?;
                Some([
                    self.first.discretize(s.slope)?,
                    self.second.discretize(s.intercept)?,
                ])
            }
        }
    }

    /// Line at the centre of `bin`.
    pub fn line_at(&self, bin: [usize; 2]) -> LineParam {
        let a = self.first.reconstruct(bin[0]);
        let b = self.second.reconstruct(bin[1]);
        match self.parameterization {
            LineParameterization::Normal => LineParam::Normal(NormalLine::new(a, b)),
            LineParameterization::Slope { .. } => LineParam::Slope(SlopeLine {
                slope: a,
                intercept: b,
            }),
        }
    }

    /// First-axis lookup table for exhaustive voting.
    pub fn vote_table(&self) -> Vec<VoteKernel> {
        (0..self.first.n_bins)
            .map(|b| {
                let a = self.first.reconstruct(b);
                match self.parameterization {
                    LineParameterization::Normal => {
                        let (s, c) = a.sin_cos();
                        VoteKernel { cx: c, cy: s }
                    }
                    // intercept = y - slope * x
                    LineParameterization::Slope { .. } => VoteKernel { cx: -a, cy: 1.0 },
                }
            })
            .collect()
    }
}

impl ParameterSpace for LineQuantization {
    fn reconstruct(&self, bin: [usize; 2]) -> [f64; 2] {
        [
            self.first.reconstruct(bin[0]),
            self.second.reconstruct(bin[1]),
        ]
    }

    fn steps(&self) -> [f64; 2] {
        [self.first.step, self.second.step]
    }
}

/// Per-first-axis-bin coefficients: second-axis value = `cx·x + cy·y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteKernel {
    pub cx: f64,
    pub cy: f64,
}

impl VoteKernel {
    #[inline]
    pub fn apply(&self, p: Point2<i32>) -> f64 {
        self.cx * p.x as f64 + self.cy * p.y as f64
    }
}

/// Quantized `(cx, cy, r)` space for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleQuantization {
    pub cx: AxisQuantizer,
    pub cy: AxisQuantizer,
    pub radius: AxisQuantizer,
}

impl CircleQuantization {
    /// Centres range over the frame, radii over `[0, diagonal]`.
    pub fn for_frame(frame: &Frame, thickness: f64) -> Result<Self, QuantizationError> {
        if !(thickness > 0.0 && thickness.is_finite()) {
            return Err(QuantizationError::InvalidThickness(thickness));
        }
        let step = thickness.max(1.0);
        let (x0, x1) = frame.x_range();
        let (y0, y1) = frame.y_range();
        Ok(Self {
            cx: AxisQuantizer::spanning(x0 as f64, x1 as f64, step, AxisDirection::Increasing),
            cy: AxisQuantizer::spanning(y0 as f64, y1 as f64, step, AxisDirection::Decreasing),
            radius: AxisQuantizer::spanning(0.0, frame.diagonal(), step, AxisDirection::Increasing),
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.cx.n_bins, self.cy.n_bins, self.radius.n_bins)
    }

    /// Parameter check + discretization: `None` rejects the circle.
    pub fn discretize(&self, circle: &Circle) -> Option<[usize; 3]> {
        Some([
            self.cx.discretize(circle.center.x)?,
            self.cy.discretize(circle.center.y)?,
            self.radius.discretize(circle.radius)?,
        ])
    }

    pub fn circle_at(&self, bin: [usize; 3]) -> Circle {
        Circle::new(
            Point2::new(self.cx.reconstruct(bin[0]), self.cy.reconstruct(bin[1])),
            self.radius.reconstruct(bin[2]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Origin;

    fn assert_axis_round_trips(axis: &AxisQuantizer) {
        for bin in 0..axis.n_bins {
            let v = axis.reconstruct(bin);
            assert_eq!(axis.discretize(v), Some(bin), "bin {bin} of {axis:?}");
        }
        let lo = axis.reconstruct(0).min(axis.reconstruct(axis.n_bins - 1));
        let hi = axis.reconstruct(0).max(axis.reconstruct(axis.n_bins - 1));
        let samples = 97;
        for k in 0..=samples {
            let v = lo + (hi - lo) * k as f64 / samples as f64;
            let bin = axis.discretize(v).expect("in range");
            assert!((axis.reconstruct(bin) - v).abs() <= 0.5 * axis.step + 1e-9);
        }
    }

    #[test]
    fn normal_axes_round_trip() {
        let frame = Frame::new(100, 80, Origin::CenterYUp).unwrap();
        let q = LineQuantization::for_frame(&frame, 1.0, LineParameterization::Normal).unwrap();
        assert_axis_round_trips(&q.first);
        assert_axis_round_trips(&q.second);
        assert_eq!(q.second.direction, AxisDirection::Decreasing);
        assert!(q.second.reconstruct(0) > q.second.reconstruct(1));
    }

    #[test]
    fn slope_axes_round_trip() {
        let frame = Frame::new(64, 48, Origin::TopLeft).unwrap();
        let q = LineQuantization::for_frame(
            &frame,
            2.0,
            LineParameterization::Slope { max_slope: 3.0 },
        )
        .unwrap();
        assert_axis_round_trips(&q.first);
        assert_axis_round_trips(&q.second);
    }

    #[test]
    fn circle_axes_round_trip() {
        let frame = Frame::new(50, 30, Origin::CenterYDown).unwrap();
        let q = CircleQuantization::for_frame(&frame, 1.0).unwrap();
        assert_axis_round_trips(&q.cx);
        assert_axis_round_trips(&q.cy);
        assert_axis_round_trips(&q.radius);
        assert_eq!(q.cx.discretize(-25.0), Some(0));
        assert_eq!(q.cy.discretize(14.0), Some(0));
    }

    #[test]
    fn angles_near_half_turn_wrap_to_first_bin() {
        let frame = Frame::new(100, 100, Origin::CenterYUp).unwrap();
        let q = LineQuantization::for_frame(&frame, 1.0, LineParameterization::Normal).unwrap();
        let almost_pi = NormalLine::new(PI - 0.1 * q.first.step, 10.0);
        let bin = q.discretize(&almost_pi).unwrap();
        assert_eq!(bin[0], 0);
        // rho flips with the half-turn
        assert_eq!(bin[1], q.second.discretize(-10.0).unwrap());
    }

    #[test]
    fn out_of_range_values_have_no_bin() {
        let frame = Frame::new(20, 20, Origin::CenterYUp).unwrap();
        let q = CircleQuantization::for_frame(&frame, 1.0).unwrap();
        let far = Circle::new(Point2::new(500.0, 0.0), 3.0);
        assert!(q.discretize(&far).is_none());
        let huge = Circle::new(Point2::new(0.0, 0.0), 1e6);
        assert!(q.discretize(&huge).is_none());
    }

    #[test]
    fn steep_lines_fall_outside_slope_space() {
        let frame = Frame::new(20, 20, Origin::CenterYUp).unwrap();
        let q = LineQuantization::for_frame(
            &frame,
            1.0,
            LineParameterization::Slope { max_slope: 1.0 },
        )
        .unwrap();
        assert!(q.discretize(&NormalLine::new(0.0, 3.0)).is_none());
        assert!(q.discretize(&NormalLine::new(0.1, 3.0)).is_none());
    }

    #[test]
    fn thickness_is_validated() {
        let frame = Frame::new(20, 20, Origin::CenterYUp).unwrap();
        assert_eq!(
            LineQuantization::for_frame(&frame, 0.0, LineParameterization::Normal),
            Err(QuantizationError::InvalidThickness(0.0))
        );
        assert!(CircleQuantization::for_frame(&frame, f64::NAN).is_err());
    }
}
