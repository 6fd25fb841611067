//! Line and circle parameter types plus the handful of closed-form solvers
//! the detectors need: two-point line, line–line and line–frame intersection,
//! three-point circumcircle, and a DDA rasterizer.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::frame::Frame;

const PARALLEL_EPS: f64 = 1e-12;
const AXIS_EPS: f64 = 1e-9;

/// Line in normal form: `x cos(theta) + y sin(theta) = rho`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalLine {
    pub theta: f64,
    pub rho: f64,
}

/// Line in slope form: `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlopeLine {
    pub slope: f64,
    pub intercept: f64,
}

/// Either line parameterization, as produced by a detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum LineParam {
    Normal(NormalLine),
    Slope(SlopeLine),
}

impl NormalLine {
    pub fn new(theta: f64, rho: f64) -> Self {
        Self { theta, rho }
    }

    /// The unique line through two distinct points, `theta` in `[0, π)`.
    pub fn through(p: Point2<f64>, q: Point2<f64>) -> Option<Self> {
        let d = q - p;
        let len = d.norm();
        if len <= 0.0 || !len.is_finite() {
            return None;
        }
        let (nx, ny) = (-d.y / len, d.x / len);
        let line = Self {
            theta: ny.atan2(nx),
            rho: nx * p.x + ny * p.y,
        };
        Some(line.normalized(0.0))
    }

    /// Same line with `theta` wrapped into `[theta_min, theta_min + π)`.
    ///
    /// Each half-turn applied to `theta` flips the sign of `rho`.
    pub fn normalized(self, theta_min: f64) -> Self {
        let mut theta = self.theta;
        let mut rho = self.rho;
        let turns = ((theta - theta_min) / PI).floor();
        if turns != 0.0 && turns.is_finite() {
            theta -= turns * PI;
            if (turns as i64) % 2 != 0 {
                rho = -rho;
            }
        }
        // floor() can leave theta == theta_min + π after rounding.
        if theta >= theta_min + PI {
            theta -= PI;
            rho = -rho;
        }
        Self { theta, rho }
    }

    /// Signed distance of `p` from the line.
    #[inline]
    pub fn signed_distance(&self, p: Point2<f64>) -> f64 {
        let (s, c) = self.theta.sin_cos();
        p.x * c + p.y * s - self.rho
    }

    /// Slope form, `None` for (near-)vertical lines.
    pub fn to_slope(&self) -> Option<SlopeLine> {
        let (s, c) = self.theta.sin_cos();
        if s.abs() < AXIS_EPS {
            return None;
        }
        Some(SlopeLine {
            slope: -c / s,
            intercept: self.rho / s,
        })
    }

    /// Parallel line shifted by `offset` along the normal.
    #[inline]
    pub fn offset(&self, offset: f64) -> Self {
        Self {
            theta: self.theta,
            rho: self.rho + offset,
        }
    }
}

impl SlopeLine {
    pub fn to_normal(&self) -> NormalLine {
        // -slope * x + y = intercept, scaled to a unit normal.
        let norm = (1.0 + self.slope * self.slope).sqrt();
        NormalLine {
            theta: (1.0 / norm).atan2(-self.slope / norm),
            rho: self.intercept / norm,
        }
        .normalized(0.0)
    }
}

impl LineParam {
    pub fn to_normal(&self) -> NormalLine {
        match self {
            LineParam::Normal(l) => *l,
            LineParam::Slope(l) => l.to_normal(),
        }
    }

    /// Parameter pair in accumulator axis order.
    pub fn as_pair(&self) -> [f64; 2] {
        match self {
            LineParam::Normal(l) => [l.theta, l.rho],
            LineParam::Slope(l) => [l.slope, l.intercept],
        }
    }
}

/// Intersection of two lines in normal form, `None` when (nearly) parallel.
pub fn intersect_lines(a: &NormalLine, b: &NormalLine) -> Option<Point2<f64>> {
    let (s1, c1) = a.theta.sin_cos();
    let (s2, c2) = b.theta.sin_cos();
    let det = c1 * s2 - s1 * c2;
    if det.abs() < PARALLEL_EPS {
        return None;
    }
    Some(Point2::new(
        (a.rho * s2 - b.rho * s1) / det,
        (c1 * b.rho - c2 * a.rho) / det,
    ))
}

/// Points where an infinite line crosses the frame border (math frame).
///
/// Returns the two farthest crossings; a line that only touches a corner
/// yields the same point twice. `None` when the line misses the frame.
pub fn frame_intersection(line: &NormalLine, frame: &Frame) -> Option<[Point2<f64>; 2]> {
    let (x0, x1) = frame.x_range();
    let (y0, y1) = frame.y_range();
    let (x0, x1, y0, y1) = (x0 as f64, x1 as f64, y0 as f64, y1 as f64);
    let (s, c) = line.theta.sin_cos();

    let mut hits: Vec<Point2<f64>> = Vec::with_capacity(4);
    if s.abs() > AXIS_EPS {
        for x in [x0, x1] {
            let y = (line.rho - x * c) / s;
            if y >= y0 - AXIS_EPS && y <= y1 + AXIS_EPS {
                hits.push(Point2::new(x, y.clamp(y0, y1)));
            }
        }
    }
    if c.abs() > AXIS_EPS {
        for y in [y0, y1] {
            let x = (line.rho - y * s) / c;
            if x >= x0 - AXIS_EPS && x <= x1 + AXIS_EPS {
                hits.push(Point2::new(x.clamp(x0, x1), y));
            }
        }
    }

    let first = *hits.first()?;
    let mut best = [first, first];
    let mut best_d = 0.0;
    for (i, a) in hits.iter().enumerate() {
        for b in hits.iter().skip(i + 1) {
            let d = (a - b).norm_squared();
            if d > best_d {
                best_d = d;
                best = [*a, *b];
            }
        }
    }
    Some(best)
}

/// Integer pixels along the segment `a → b` (DDA, both ends included).
pub fn raster_segment(a: Point2<f64>, b: Point2<f64>) -> Vec<Point2<i32>> {
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs()).ceil();
    if !steps.is_finite() {
        return Vec::new();
    }
    let n = steps as usize;
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let t = if n == 0 { 0.0 } else { i as f64 / n as f64 };
        let p = a + d * t;
        let q = Point2::new(p.x.round() as i32, p.y.round() as i32);
        if out.last() != Some(&q) {
            out.push(q);
        }
    }
    out
}

/// Circle in the math frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Distance from `p` to the circle outline.
    #[inline]
    pub fn radial_distance(&self, p: Point2<f64>) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }
}

/// Exact circle through three points.
///
/// `d` is twice the signed triangle area; collinear (or repeated) points give
/// `d == 0` and no circle.
pub fn circumcircle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Option<Circle> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point2::new(ux, uy);
    let radius = (a - center).norm();
    if !radius.is_finite() {
        return None;
    }
    Some(Circle { center, radius })
}

/// Integer point as `f64`.
#[inline]
pub fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Origin;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn line_through_diagonal_points() {
        let l = NormalLine::through(Point2::new(-40.0, 40.0), Point2::new(40.0, -40.0)).unwrap();
        assert_abs_diff_eq!(l.theta, FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rho, 0.0, epsilon = 1e-12);

        let v = NormalLine::through(Point2::new(3.0, 0.0), Point2::new(3.0, 5.0)).unwrap();
        assert_abs_diff_eq!(v.theta, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.rho, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn coincident_points_have_no_line() {
        let p = Point2::new(1.0, 2.0);
        assert!(NormalLine::through(p, p).is_none());
    }

    #[test]
    fn normalization_flips_rho_per_half_turn() {
        let l = NormalLine::new(-FRAC_PI_4, 2.0).normalized(0.0);
        assert_abs_diff_eq!(l.theta, 3.0 * FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rho, -2.0, epsilon = 1e-12);

        let l = NormalLine::new(2.0 * PI + 0.1, 2.0).normalized(0.0);
        assert_abs_diff_eq!(l.theta, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rho, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn slope_and_normal_forms_agree() {
        let s = SlopeLine {
            slope: 0.5,
            intercept: 3.0,
        };
        let n = s.to_normal();
        for x in [-10.0, 0.0, 7.0] {
            let p = Point2::new(x, 0.5 * x + 3.0);
            assert_abs_diff_eq!(n.signed_distance(p), 0.0, epsilon = 1e-9);
        }
        let back = n.to_slope().unwrap();
        assert_abs_diff_eq!(back.slope, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(back.intercept, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn perpendicular_lines_intersect() {
        let vertical = NormalLine::new(0.0, 4.0);
        let horizontal = NormalLine::new(PI / 2.0, -2.0);
        let p = intersect_lines(&vertical, &horizontal).unwrap();
        assert_abs_diff_eq!(p.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, -2.0, epsilon = 1e-12);
        assert!(intersect_lines(&vertical, &NormalLine::new(0.0, 1.0)).is_none());
    }

    #[test]
    fn frame_crossings_of_a_diagonal() {
        let frame = Frame::new(100, 100, Origin::CenterYUp).unwrap();
        let [a, b] = frame_intersection(&NormalLine::new(FRAC_PI_4, 0.0), &frame).unwrap();
        let (lo, hi) = if a.x < b.x { (a, b) } else { (b, a) };
        assert_abs_diff_eq!(lo.x, -50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lo.y, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hi.x, 49.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hi.y, -49.0, epsilon = 1e-9);

        assert!(frame_intersection(&NormalLine::new(0.0, 500.0), &frame).is_none());
    }

    #[test]
    fn raster_segment_has_no_gaps() {
        let pts = raster_segment(Point2::new(0.0, 0.0), Point2::new(3.0, 9.0));
        assert_eq!(pts.first(), Some(&Point2::new(0, 0)));
        assert_eq!(pts.last(), Some(&Point2::new(3, 9)));
        for w in pts.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1 && (w[1].y - w[0].y).abs() <= 1);
        }
    }

    #[test]
    fn circumcircle_is_equidistant() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        let c = Point2::new(1.0, 1.0);
        let circle = circumcircle(a, b, c).unwrap();
        assert_abs_diff_eq!(circle.center.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(circle.center.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(circle.radius, 1.0, epsilon = 1e-12);
        for p in [a, b, c] {
            assert_abs_diff_eq!(circle.radial_distance(p), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn collinear_triple_has_no_circle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        let c = Point2::new(5.0, 5.0);
        assert!(circumcircle(a, b, c).is_none());
        assert!(circumcircle(a, a, c).is_none());
    }
}
