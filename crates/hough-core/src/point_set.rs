//! Mutable set of foreground points ("binary image") in the math frame.
//!
//! Removal is swap-with-last, so indices are not stable across removals.
//! Every operation on an empty set is a no-op.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError, Origin};
use crate::geometry::{frame_intersection, raster_segment, to_f64, NormalLine};
use crate::image::{GrayImage, GrayImageView, ImageError, Polarity};
use crate::sampling::UniformSource;

/// Perpendicular step used by [`LineRemoval::Sweep`].
const SWEEP_STEP: f64 = 0.25;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PointSetError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// How points explained by a line are cleared.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRemoval {
    /// Rasterize the line once and clear a square neighbourhood around every
    /// rasterized pixel.
    #[default]
    Rasterized,
    /// Rasterize parallel copies of the line at quarter-pixel perpendicular
    /// offsets and clear only pixels hit exactly. Slower, leaves no gaps.
    Sweep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointSet {
    frame: Frame,
    points: Vec<Point2<i32>>,
}

impl PointSet {
    /// Empty set over a `width × height` frame.
    pub fn new(width: usize, height: usize, origin: Origin) -> Result<Self, PointSetError> {
        Ok(Self {
            frame: Frame::new(width, height, origin)?,
            points: Vec::new(),
        })
    }

    /// Collect every pixel of `image` on the `polarity` side of `threshold`.
    pub fn from_image(
        image: &GrayImageView<'_>,
        polarity: Polarity,
        threshold: u8,
        origin: Origin,
    ) -> Result<Self, PointSetError> {
        image.validate()?;
        let frame = Frame::new(image.width, image.height, origin)?;
        let mut points = Vec::new();
        for y in 0..image.height {
            for x in 0..image.width {
                if polarity.is_foreground(image.pixel(x, y), threshold) {
                    points.push(frame.to_math(x, y));
                }
            }
        }
        log::debug!(
            "point set from {}x{} image: {} foreground points ({:?}, threshold {threshold})",
            image.width,
            image.height,
            points.len(),
            polarity
        );
        Ok(Self { frame, points })
    }

    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<Point2<i32>> {
        self.points.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2<i32>> + '_ {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point2<i32>] {
        &self.points
    }

    /// Append a point. Returns `false` (and ignores it) outside the frame.
    pub fn add(&mut self, p: Point2<i32>) -> bool {
        if !self.frame.contains(p) {
            return false;
        }
        self.points.push(p);
        true
    }

    /// Append unless already present. Linear scan; keep off hot paths.
    pub fn add_unique(&mut self, p: Point2<i32>) -> bool {
        if self.points.contains(&p) {
            return false;
        }
        self.add(p)
    }

    /// Swap-with-last removal.
    pub fn remove_at(&mut self, i: usize) -> Option<Point2<i32>> {
        if i >= self.points.len() {
            return None;
        }
        Some(self.points.swap_remove(i))
    }

    /// Remove every point within Chebyshev distance `radius` of `p`.
    pub fn remove_near(&mut self, p: Point2<i32>, radius: u32) -> usize {
        let r = radius as i32;
        self.remove_where(|q| (q.x - p.x).abs() <= r && (q.y - p.y).abs() <= r)
    }

    /// Remove points explained by `line` within `thickness` pixels.
    pub fn remove_along_line(
        &mut self,
        line: &NormalLine,
        thickness: f64,
        mode: LineRemoval,
    ) -> usize {
        if self.points.is_empty() || !thickness.is_finite() {
            return 0;
        }
        let thickness = thickness.max(0.0);
        let mut mask = vec![false; self.frame.pixel_count()];
        match mode {
            LineRemoval::Rasterized => {
                let radius = thickness.round() as i32;
                for p in self.rasterize(line) {
                    self.mark_square(&mut mask, p, radius);
                }
            }
            LineRemoval::Sweep => {
                let steps = (thickness / SWEEP_STEP).floor() as i64;
                for k in -steps..=steps {
                    for p in self.rasterize(&line.offset(k as f64 * SWEEP_STEP)) {
                        self.mark_square(&mut mask, p, 0);
                    }
                }
            }
        }
        let frame = self.frame;
        self.remove_where(|q| {
            frame
                .to_pixel(*q)
                .map(|(x, y)| mask[y * frame.width + x])
                .unwrap_or(false)
        })
    }

    /// Remove points lying within `tolerance` of the circle outline.
    pub fn remove_near_circle(
        &mut self,
        center: Point2<f64>,
        radius: f64,
        tolerance: f64,
    ) -> usize {
        if !(radius.is_finite() && tolerance.is_finite()) {
            return 0;
        }
        self.remove_where(|q| {
            let d = (to_f64(*q) - center).norm();
            (d - radius).abs() <= tolerance
        })
    }

    /// Randomly drop points until about `ratio` of them remain.
    ///
    /// `ratio` outside `(0, 1]` leaves the set untouched. Returns the number of
    /// points removed.
    pub fn subsample<R: UniformSource + ?Sized>(&mut self, ratio: f64, rng: &mut R) -> usize {
        if !(ratio > 0.0 && ratio <= 1.0) {
            log::warn!("subsample ratio {ratio} outside (0, 1]; keeping all points");
            return 0;
        }
        let drop = ((1.0 - ratio) * self.points.len() as f64).floor() as usize;
        for _ in 0..drop {
            let i = rng.next_index(self.points.len());
            self.points.swap_remove(i);
        }
        drop
    }

    /// Where `line` enters and leaves the frame.
    pub fn frame_intersection(&self, line: &NormalLine) -> Option<[Point2<f64>; 2]> {
        frame_intersection(line, &self.frame)
    }

    /// Render the set as a white image with black points.
    pub fn to_image(&self) -> GrayImage {
        let mut img = GrayImage::filled(self.frame.width, self.frame.height, 255);
        for p in &self.points {
            if let Some((x, y)) = self.frame.to_pixel(*p) {
                img.put(x, y, 0);
            }
        }
        img
    }

    fn rasterize(&self, line: &NormalLine) -> Vec<Point2<i32>> {
        match self.frame_intersection(line) {
            Some([a, b]) => raster_segment(a, b),
            None => Vec::new(),
        }
    }

    fn mark_square(&self, mask: &mut [bool], p: Point2<i32>, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let q = Point2::new(p.x + dx, p.y + dy);
                if let Some((x, y)) = self.frame.to_pixel(q) {
                    mask[y * self.frame.width + x] = true;
                }
            }
        }
    }

    /// Sweep from the back so swap-with-last never skips a point.
    fn remove_where<F: Fn(&Point2<i32>) -> bool>(&mut self, pred: F) -> usize {
        let before = self.points.len();
        let mut i = self.points.len();
        while i > 0 {
            i -= 1;
            if pred(&self.points[i]) {
                self.points.swap_remove(i);
            }
        }
        before - self.points.len()
    }
}
