//! End-to-end helpers over `image::GrayImage`.

use std::path::{Path, PathBuf};

use hough_circles::{CircleDetectError, CircleDetection, CircleObserver, RandomizedCircleDetector};
use hough_core::{
    DetectionObserver, GrayImageView, PeakEvent, PointSet, PointSetError, UniformSource,
};
use hough_lines::{
    DetectedLine, LineDetectError, LineDetection, LineObserver, ProbabilisticLineDetector,
    RandomizedLineDetector, StandardLineDetector,
};
use log::warn;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Binarize, DetectionConfig};

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("raster of {width}x{height} does not match its buffer of {len} bytes")]
    InvalidGrayBuffer {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error(transparent)]
    PointSet(#[from] PointSetError),
    #[error(transparent)]
    Lines(#[from] LineDetectError),
    #[error(transparent)]
    Circles(#[from] CircleDetectError),
}

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a core raster into an `image::GrayImage` (for saving).
pub fn to_image(raster: &hough_core::GrayImage) -> Result<::image::GrayImage, DetectError> {
    let err = || DetectError::InvalidGrayBuffer {
        width: raster.width,
        height: raster.height,
        len: raster.data.len(),
    };
    let w = u32::try_from(raster.width).map_err(|_| err())?;
    let h = u32::try_from(raster.height).map_err(|_| err())?;
    ::image::GrayImage::from_raw(w, h, raster.data.clone()).ok_or_else(err)
}

pub fn point_set(img: &::image::GrayImage, binarize: &Binarize) -> Result<PointSet, DetectError> {
    Ok(PointSet::from_image(
        &gray_view(img),
        binarize.polarity,
        binarize.threshold,
        binarize.origin,
    )?)
}

/// Exhaustive transform followed by peak extraction. The detector is
/// returned so callers can export its accumulator.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, config),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_lines_standard(
    img: &::image::GrayImage,
    config: &DetectionConfig,
    thickness: f64,
    votes: u32,
) -> Result<(Vec<DetectedLine>, StandardLineDetector), DetectError> {
    let mut det = StandardLineDetector::new(config.standard_params());
    det.run(&gray_view(img), thickness)?;
    let lines = det.find_peaks(&config.peaks, votes)?;
    Ok((lines, det))
}

#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, config, rng, observer),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_lines_randomized<R: UniformSource>(
    img: &::image::GrayImage,
    config: &DetectionConfig,
    votes: u32,
    max_shapes: usize,
    rng: R,
    observer: Option<LineObserver>,
) -> Result<LineDetection, DetectError> {
    let points = point_set(img, &config.binarize)?;
    let mut det = RandomizedLineDetector::with_rng(config.randomized.clone(), rng);
    det.set_observer(observer);
    det.initialize(points)?;
    Ok(det.run(votes, max_shapes)?)
}

pub fn detect_lines_probabilistic<R: UniformSource>(
    img: &::image::GrayImage,
    config: &DetectionConfig,
    votes: u32,
    max_shapes: usize,
    rng: R,
    observer: Option<LineObserver>,
) -> Result<LineDetection, DetectError> {
    let points = point_set(img, &config.binarize)?;
    let mut det = ProbabilisticLineDetector::with_rng(config.probabilistic.clone(), rng);
    if let Some(observer) = observer {
        det = det.with_observer(observer);
    }
    det.initialize(points)?;
    Ok(det.run(votes, max_shapes)?)
}

#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, config, rng, observer),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_circles<R: UniformSource>(
    img: &::image::GrayImage,
    config: &DetectionConfig,
    votes: u32,
    rng: R,
    observer: Option<CircleObserver>,
) -> Result<CircleDetection, DetectError> {
    let points = point_set(img, &config.binarize)?;
    let mut det = RandomizedCircleDetector::with_rng(config.circles.clone(), rng);
    det.set_observer(observer);
    det.initialize(points)?;
    Ok(det.run(votes)?)
}

/// Accumulator of a finished standard run as an 8-bit image.
pub fn accumulator_image(
    det: &StandardLineDetector,
) -> Result<Option<::image::GrayImage>, DetectError> {
    det.accumulator_image()
        .map(|raster| to_image(&raster))
        .transpose()
}

/// Observer writing the remaining point set after every peak as
/// `<prefix>_<NNNN>.png` in `dir`.
///
/// Write failures are logged and counted, never propagated into detection.
#[derive(Debug)]
pub struct FrameDumpObserver {
    dir: PathBuf,
    prefix: String,
    written: usize,
    failed: usize,
}

impl FrameDumpObserver {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: 0,
            failed: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    fn dump(&mut self, points: &PointSet) {
        let path = self
            .dir
            .join(format!("{}_{:04}.png", self.prefix, self.written + self.failed));
        let result = to_image(&points.to_image())
            .map_err(|e| e.to_string())
            .and_then(|img| img.save(&path).map_err(|e| e.to_string()));
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                self.failed += 1;
                warn!("failed to write {}: {e}", path.display());
            }
        }
    }
}

impl<S> DetectionObserver<S> for FrameDumpObserver {
    fn on_peak(&mut self, event: &PeakEvent<'_, S>) {
        self.dump(event.remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hough_core::{seeded_rng, Origin, Point2};

    fn diagonal() -> ::image::GrayImage {
        let mut img = ::image::GrayImage::from_pixel(100, 100, ::image::Luma([255]));
        for i in 10..=90 {
            img.put_pixel(i, i, ::image::Luma([0]));
        }
        img
    }

    #[test]
    fn view_matches_image() {
        let img = diagonal();
        let view = gray_view(&img);
        assert_eq!((view.width, view.height), (100, 100));
        assert_eq!(view.pixel(10, 10), 0);
        assert_eq!(view.pixel(11, 10), 255);
    }

    #[test]
    fn core_raster_roundtrips_through_image() {
        let mut set = PointSet::new(4, 3, Origin::TopLeft).unwrap();
        set.add(Point2::new(1, 2));
        let img = to_image(&set.to_image()).unwrap();
        assert_eq!(img.get_pixel(1, 2).0, [0]);
        assert_eq!(img.get_pixel(0, 0).0, [255]);

        let bad = hough_core::GrayImage {
            width: 3,
            height: 3,
            data: vec![0; 4],
        };
        assert!(matches!(
            to_image(&bad),
            Err(DetectError::InvalidGrayBuffer { len: 4, .. })
        ));
    }

    #[test]
    fn standard_helper_finds_diagonal() {
        let (lines, det) =
            detect_lines_standard(&diagonal(), &DetectionConfig::default(), 1.0, 60).unwrap();
        assert!(!lines.is_empty());
        approx::assert_abs_diff_eq!(
            lines[0].normal().theta,
            std::f64::consts::FRAC_PI_4,
            epsilon = 0.02
        );
        let acc = accumulator_image(&det).unwrap().unwrap();
        let (w, h) = det.quantization().unwrap().dims();
        assert_eq!((acc.width() as usize, acc.height() as usize), (w, h));
    }

    #[test]
    fn frame_dump_writes_one_png_per_peak() {
        let dir = tempfile::tempdir().unwrap();
        let res = detect_lines_randomized(
            &diagonal(),
            &DetectionConfig::default(),
            50,
            5,
            seeded_rng(2),
            Some(Box::new(FrameDumpObserver::new(dir.path(), "lines"))),
        )
        .unwrap();
        assert_eq!(res.lines.len(), 1);
        let first = dir.path().join("lines_0000.png");
        assert!(first.exists());
        let frame = ::image::open(first).unwrap().to_luma8();
        assert!(frame.pixels().all(|p| p.0 == [255]));
    }
}
