//! JSON run configuration shared by the CLI and embedding applications.

use std::path::Path;

use hough_circles::RandomizedCircleParams;
use hough_core::{Origin, PeakStrategy, Polarity};
use hough_lines::{ProbabilisticLineParams, RandomizedLineParams, StandardLineParams};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How an image is turned into a point set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binarize {
    pub polarity: Polarity,
    pub threshold: u8,
    pub origin: Origin,
}

impl Default for Binarize {
    fn default() -> Self {
        Self {
            polarity: Polarity::Dark,
            threshold: 128,
            origin: Origin::CenterYUp,
        }
    }
}

/// Every tunable of a detection run. Missing sections take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Applies to every detector; overrides the binarization fields of
    /// `standard`.
    pub binarize: Binarize,
    pub standard: StandardLineParams,
    pub peaks: PeakStrategy,
    pub randomized: RandomizedLineParams,
    pub probabilistic: ProbabilisticLineParams,
    pub circles: RandomizedCircleParams,
}

impl DetectionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Standard-transform parameters with `binarize` applied.
    pub fn standard_params(&self) -> StandardLineParams {
        StandardLineParams {
            polarity: self.binarize.polarity,
            threshold: self.binarize.threshold,
            origin: self.binarize.origin,
            ..self.standard.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hough_core::AccumulatorKind;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(
            DetectionConfig::from_json_str("{}").unwrap(),
            DetectionConfig::default()
        );
    }

    #[test]
    fn sections_merge_with_defaults() {
        let cfg = DetectionConfig::from_json_str(
            r#"{
                "binarize": { "polarity": "bright", "origin": "top_left" },
                "peaks": { "kind": "matched_filter" },
                "randomized": { "accumulator": "dense", "max_iterations": 900 },
                "circles": { "max_shapes": 2 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.binarize.polarity, Polarity::Bright);
        assert_eq!(cfg.binarize.threshold, 128);
        assert_eq!(cfg.peaks, PeakStrategy::MatchedFilter);
        assert_eq!(cfg.randomized.accumulator, AccumulatorKind::Dense);
        assert_eq!(cfg.randomized.max_iterations, Some(900));
        assert_eq!(cfg.circles.max_shapes, 2);
        assert_eq!(cfg.circles.narrow_tolerance, 2.0);

        let std_params = cfg.standard_params();
        assert_eq!(std_params.polarity, Polarity::Bright);
        assert_eq!(std_params.origin, Origin::TopLeft);
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = DetectionConfig::from_json_file(Path::new("/nonexistent/hough.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hough.json"));
    }
}
