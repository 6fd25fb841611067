use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizedCircleParams {
    /// Outline thickness in pixels; bin width of all three axes.
    pub thickness: f64,
    /// Minimum pairwise distance between the three sampled points.
    pub min_separation: f64,
    /// Overrides the `points × threshold` default.
    pub max_iterations: Option<usize>,
    pub max_shapes: usize,
    /// Stop once no more than `factor × threshold` points remain.
    pub min_remaining_factor: f64,
    pub max_sample_attempts: usize,
    /// Radial removal tolerance for a new circle.
    pub narrow_tolerance: f64,
    /// Radial removal tolerance for a circle found again.
    pub wide_tolerance: f64,
}

impl Default for RandomizedCircleParams {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            min_separation: 5.0,
            max_iterations: None,
            max_shapes: 15,
            min_remaining_factor: 3.0,
            max_sample_attempts: 100,
            narrow_tolerance: 2.0,
            wide_tolerance: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_overrides_only_named_fields() {
        let p: RandomizedCircleParams =
            serde_json::from_str(r#"{ "max_shapes": 3, "wide_tolerance": 6.5 }"#).unwrap();
        assert_eq!(p.max_shapes, 3);
        assert_eq!(p.wide_tolerance, 6.5);
        assert_eq!(p.min_remaining_factor, 3.0);
        assert_eq!(p.max_iterations, None);
    }
}
