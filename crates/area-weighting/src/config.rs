//! Configuration for aggregation runs.

use grid_common::Crs;
use serde::{Deserialize, Serialize};

/// Configuration for the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Planar CRS areas are measured in. `None` picks the UTM zone of the
    /// target grid's centre.
    pub working_crs: Option<Crs>,

    /// Weight sums above `1 + overflow_epsilon` raise a warning.
    pub overflow_epsilon: f64,

    /// Intersections with a smaller area (working CRS units²) are ignored.
    pub min_intersection_area: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            working_crs: None,
            overflow_epsilon: 1e-6,
            min_intersection_area: 0.0,
        }
    }
}

impl AggregationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WEIGHTING_CRS") {
            if !val.trim().is_empty() {
                config.working_crs = Some(Crs::parse(val.trim()));
            }
        }

        if let Ok(val) = std::env::var("WEIGHTING_OVERFLOW_EPSILON") {
            if let Ok(eps) = val.parse() {
                config.overflow_epsilon = eps;
            }
        }

        if let Ok(val) = std::env::var("WEIGHTING_MIN_AREA") {
            if let Ok(area) = val.parse() {
                config.min_intersection_area = area;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(crs) = &self.working_crs {
            if crs.is_geographic() {
                return Err(format!("working_crs {} is geographic; areas need a projected CRS", crs));
            }
            if !crs.is_supported() {
                return Err(format!("working_crs {} is not supported", crs));
            }
        }

        if !(self.overflow_epsilon >= 0.0 && self.overflow_epsilon.is_finite()) {
            return Err("overflow_epsilon must be a finite value >= 0".to_string());
        }

        if !(self.min_intersection_area >= 0.0 && self.min_intersection_area.is_finite()) {
            return Err("min_intersection_area must be a finite value >= 0".to_string());
        }

        Ok(())
    }
}
