//! Exhaustive Hough transform: every foreground point votes for every
//! first-axis bin.

use hough_core::{
    Accumulator, DenseAccumulator, GrayImage, GrayImageView, LineQuantization, PeakStrategy,
    PointSet,
};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DetectedLine, LineDetectError, StandardLineParams};

/// Deterministic line detector over a dense accumulator.
///
/// `run` votes, `find_peaks` reads the result; the accumulator is kept (and
/// reused when the dimensions do not change) between runs.
#[derive(Clone, Debug)]
pub struct StandardLineDetector {
    params: StandardLineParams,
    quantization: Option<LineQuantization>,
    accumulator: Option<DenseAccumulator>,
}

impl StandardLineDetector {
    pub fn new(params: StandardLineParams) -> Self {
        Self {
            params,
            quantization: None,
            accumulator: None,
        }
    }

    pub fn params(&self) -> &StandardLineParams {
        &self.params
    }

    /// Binarize `image` and vote every foreground point. Returns the number of
    /// points that voted.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width, height = image.height)
        )
    )]
    pub fn run(
        &mut self,
        image: &GrayImageView<'_>,
        thickness: f64,
    ) -> Result<usize, LineDetectError> {
        let points = PointSet::from_image(
            image,
            self.params.polarity,
            self.params.threshold,
            self.params.origin,
        )?;
        self.vote(&points, thickness)?;
        Ok(points.len())
    }

    /// Vote an existing point set.
    pub fn vote(&mut self, points: &PointSet, thickness: f64) -> Result<(), LineDetectError> {
        let quant =
            LineQuantization::for_frame(points.frame(), thickness, self.params.parameterization)?;
        let (w, h) = quant.dims();

        // A failed allocation leaves the previous result in place.
        let mut acc = match self.accumulator.take() {
            Some(acc) if acc.dims() == (w, h) => acc,
            previous => match DenseAccumulator::with_limit(w, h, self.params.max_cells) {
                Ok(acc) => acc,
                Err(err) => {
                    self.accumulator = previous;
                    return Err(err.into());
                }
            },
        };
        acc.reset();
        acc.set_threshold(0);

        let table = quant.vote_table();
        for &p in points.iter() {
            for (b1, kernel) in table.iter().enumerate() {
                if let Some(b2) = quant.second.discretize(kernel.apply(p)) {
                    acc.increment([b1, b2]);
                }
            }
        }
        debug!(
            "voted {} points into {}x{} cells, max count {}",
            points.len(),
            w,
            h,
            acc.max_count()
        );
        self.accumulator = Some(acc);
        self.quantization = Some(quant);
        Ok(())
    }

    /// Lines whose cells exceed `threshold`, strongest first for
    /// [`PeakStrategy::ThresholdSuppression`], row-major for the filter.
    pub fn find_peaks(
        &mut self,
        strategy: &PeakStrategy,
        threshold: u32,
    ) -> Result<Vec<DetectedLine>, LineDetectError> {
        let (Some(acc), Some(quant)) = (self.accumulator.as_mut(), self.quantization.as_ref())
        else {
            return Err(LineDetectError::NotInitialized);
        };
        acc.set_threshold(threshold);
        let peaks = acc.find_peaks(strategy, quant)?;
        Ok(peaks
            .into_iter()
            .map(|p| DetectedLine {
                param: quant.line_at(p.bin),
                votes: p.votes,
            })
            .collect())
    }

    pub fn accumulator(&self) -> Option<&DenseAccumulator> {
        self.accumulator.as_ref()
    }

    pub fn quantization(&self) -> Option<&LineQuantization> {
        self.quantization.as_ref()
    }

    /// Accumulator rescaled to 8 bits, first axis on columns.
    pub fn accumulator_image(&self) -> Option<GrayImage> {
        self.accumulator.as_ref().map(DenseAccumulator::to_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hough_core::{AccumulatorError, LineParameterization, Origin};

    fn diagonal_image(size: usize) -> GrayImage {
        let mut img = GrayImage::filled(size, size, 255);
        for i in 10..size - 10 {
            img.put(i, i, 0);
        }
        img
    }

    #[test]
    fn peaks_before_run_fail() {
        let mut det = StandardLineDetector::new(StandardLineParams::default());
        assert!(matches!(
            det.find_peaks(&PeakStrategy::default(), 10),
            Err(LineDetectError::NotInitialized)
        ));
    }

    #[test]
    fn invalid_thickness_is_rejected() {
        let img = diagonal_image(40);
        let mut det = StandardLineDetector::new(StandardLineParams::default());
        assert!(matches!(
            det.run(&img.view(), 0.0),
            Err(LineDetectError::Quantization(_))
        ));
        assert!(matches!(
            det.run(&img.view(), f64::NAN),
            Err(LineDetectError::Quantization(_))
        ));
        assert!(det.accumulator().is_none());
    }

    #[test]
    fn too_small_cell_limit_fails_fast() {
        let img = diagonal_image(40);
        let mut det = StandardLineDetector::new(StandardLineParams {
            max_cells: 16,
            ..Default::default()
        });
        assert!(matches!(
            det.run(&img.view(), 1.0),
            Err(LineDetectError::Accumulator(_))
        ));
    }

    #[test]
    fn failed_reallocation_keeps_previous_result() {
        let small = diagonal_image(40);
        let mut det = StandardLineDetector::new(StandardLineParams {
            max_cells: 20_000,
            ..Default::default()
        });
        det.run(&small.view(), 1.0).unwrap();
        let before = det.find_peaks(&PeakStrategy::default(), 15).unwrap();
        assert!(!before.is_empty());
        let acc = det.accumulator().unwrap().clone();
        let quant = *det.quantization().unwrap();

        let large = diagonal_image(400);
        assert!(matches!(
            det.run(&large.view(), 1.0),
            Err(LineDetectError::Accumulator(AccumulatorError::TooLarge { .. }))
        ));
        assert_eq!(det.accumulator(), Some(&acc));
        assert_eq!(det.quantization(), Some(&quant));
        assert_eq!(
            det.find_peaks(&PeakStrategy::default(), 15).unwrap(),
            before
        );
    }

    #[test]
    fn slope_form_finds_diagonal() {
        let img = diagonal_image(60);
        let mut det = StandardLineDetector::new(StandardLineParams {
            origin: Origin::CenterYUp,
            parameterization: LineParameterization::Slope { max_slope: 3.0 },
            ..Default::default()
        });
        assert_eq!(det.run(&img.view(), 1.0).unwrap(), 40);
        let lines = det.find_peaks(&PeakStrategy::default(), 30).unwrap();
        let hough_core::LineParam::Slope(best) = lines[0].param else {
            panic!("expected slope form, got {:?}", lines[0].param);
        };
        // y grows downwards in pixels, upwards in the frame.
        approx::assert_abs_diff_eq!(best.slope, -1.0, epsilon = 0.05);
        approx::assert_abs_diff_eq!(best.intercept, 0.0, epsilon = 1.5);
    }

    #[test]
    fn accumulator_is_reused_for_same_dimensions() {
        let img = diagonal_image(30);
        let mut det = StandardLineDetector::new(StandardLineParams::default());
        det.run(&img.view(), 1.0).unwrap();
        let first = det.accumulator().unwrap().clone();
        det.run(&img.view(), 1.0).unwrap();
        assert_eq!(det.accumulator().unwrap(), &first);
    }
}
