//! Pixel frame ↔ math frame conversion.
//!
//! Detectors work in a "math" frame whose origin and Y direction are picked
//! once per point set. Pixel `(px, py)` always has `py` growing downwards.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin convention of the math frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Origin at the top-left pixel, Y pointing down (math == pixel).
    TopLeft,
    /// Origin at the image centre, Y pointing up.
    #[default]
    CenterYUp,
    /// Origin at the image centre, Y pointing down.
    CenterYDown,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame must have non-zero size (width={width}, height={height})")]
    EmptyFrame { width: usize, height: usize },
    #[error("frame is too large for i32 coordinates (width={width}, height={height})")]
    TooLarge { width: usize, height: usize },
    #[error("unknown origin convention '{0}' (expected top_left, center_y_up or center_y_down)")]
    UnknownOrigin(String),
}

impl FromStr for Origin {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top_left" | "corner" => Ok(Origin::TopLeft),
            "center_y_up" | "center" => Ok(Origin::CenterYUp),
            "center_y_down" => Ok(Origin::CenterYDown),
            _ => Err(FrameError::UnknownOrigin(s.to_string())),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::TopLeft => "top_left",
            Origin::CenterYUp => "center_y_up",
            Origin::CenterYDown => "center_y_down",
        };
        f.write_str(name)
    }
}

/// Rectangular image frame with a fixed origin convention.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub origin: Origin,
}

impl Frame {
    pub fn new(width: usize, height: usize, origin: Origin) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame { width, height });
        }
        if width > i32::MAX as usize / 2 || height > i32::MAX as usize / 2 {
            return Err(FrameError::TooLarge { width, height });
        }
        Ok(Self {
            width,
            height,
            origin,
        })
    }

    #[inline]
    fn half_w(&self) -> i32 {
        (self.width / 2) as i32
    }

    #[inline]
    fn half_h(&self) -> i32 {
        (self.height / 2) as i32
    }

    /// Convert a pixel coordinate into the math frame.
    #[inline]
    pub fn to_math(&self, px: usize, py: usize) -> Point2<i32> {
        let (px, py) = (px as i32, py as i32);
        match self.origin {
            Origin::TopLeft => Point2::new(px, py),
            Origin::CenterYUp => Point2::new(px - self.half_w(), self.half_h() - py),
            Origin::CenterYDown => Point2::new(px - self.half_w(), py - self.half_h()),
        }
    }

    /// Convert a math-frame point back to pixel indices, `None` outside the frame.
    #[inline]
    pub fn to_pixel(&self, p: Point2<i32>) -> Option<(usize, usize)> {
        let (px, py) = match self.origin {
            Origin::TopLeft => (p.x, p.y),
            Origin::CenterYUp => (p.x + self.half_w(), self.half_h() - p.y),
            Origin::CenterYDown => (p.x + self.half_w(), p.y + self.half_h()),
        };
        if px < 0 || py < 0 || px as usize >= self.width || py as usize >= self.height {
            return None;
        }
        Some((px as usize, py as usize))
    }

    #[inline]
    pub fn contains(&self, p: Point2<i32>) -> bool {
        self.to_pixel(p).is_some()
    }

    /// Inclusive math-frame x range.
    pub fn x_range(&self) -> (i32, i32) {
        let w = self.width as i32;
        match self.origin {
            Origin::TopLeft => (0, w - 1),
            Origin::CenterYUp | Origin::CenterYDown => (-self.half_w(), w - 1 - self.half_w()),
        }
    }

    /// Inclusive math-frame y range.
    pub fn y_range(&self) -> (i32, i32) {
        let h = self.height as i32;
        match self.origin {
            Origin::TopLeft => (0, h - 1),
            Origin::CenterYUp => (self.half_h() - (h - 1), self.half_h()),
            Origin::CenterYDown => (-self.half_h(), h - 1 - self.half_h()),
        }
    }

    /// Largest distance from the math origin to any frame corner.
    pub fn max_radius(&self) -> f64 {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        let mx = (x0.abs().max(x1.abs())) as f64;
        let my = (y0.abs().max(y1.abs())) as f64;
        mx.hypot(my)
    }

    /// Largest |x| and |y| reachable in the frame.
    pub fn max_abs(&self) -> (f64, f64) {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        (x0.abs().max(x1.abs()) as f64, y0.abs().max(y1.abs()) as f64)
    }

    pub fn diagonal(&self) -> f64 {
        (self.width as f64).hypot(self.height as f64)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_y_up_flips_rows() {
        let f = Frame::new(100, 100, Origin::CenterYUp).unwrap();
        assert_eq!(f.to_math(10, 10), Point2::new(-40, 40));
        assert_eq!(f.to_math(90, 90), Point2::new(40, -40));
        assert_eq!(f.to_pixel(Point2::new(-40, 40)), Some((10, 10)));
        assert_eq!(f.x_range(), (-50, 49));
        assert_eq!(f.y_range(), (-49, 50));
    }

    #[test]
    fn every_pixel_round_trips_for_all_origins() {
        for origin in [Origin::TopLeft, Origin::CenterYUp, Origin::CenterYDown] {
            let f = Frame::new(7, 4, origin).unwrap();
            let (x0, x1) = f.x_range();
            let (y0, y1) = f.y_range();
            for py in 0..4 {
                for px in 0..7 {
                    let p = f.to_math(px, py);
                    assert!(p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1);
                    assert_eq!(f.to_pixel(p), Some((px, py)), "{origin}");
                }
            }
        }
    }

    #[test]
    fn origin_parses_from_cli_names() {
        assert_eq!("top-left".parse::<Origin>().unwrap(), Origin::TopLeft);
        assert_eq!("center_y_down".parse::<Origin>().unwrap(), Origin::CenterYDown);
        assert!(matches!(
            "middle".parse::<Origin>(),
            Err(FrameError::UnknownOrigin(_))
        ));
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        assert_eq!(
            Frame::new(0, 3, Origin::TopLeft),
            Err(FrameError::EmptyFrame {
                width: 0,
                height: 3
            })
        );
    }
}
