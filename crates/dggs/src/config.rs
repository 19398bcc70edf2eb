//! Configuration for grid generation.

use grid_common::ROUND_DIGITS;
use serde::{Deserialize, Serialize};

use crate::rhealpix::DEFAULT_EDGE_SAMPLES;
use crate::MAX_RESOLUTION;

/// Configuration for the grid generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Subdivision level of generated cells.
    pub level: i32,

    /// Boundary samples per cell edge (corner included).
    pub edge_samples: usize,

    /// Decimal digits kept on boundary coordinates.
    pub round_digits: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            level: 10,
            edge_samples: DEFAULT_EDGE_SAMPLES,
            round_digits: ROUND_DIGITS,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_LEVEL") {
            if let Ok(level) = val.parse() {
                config.level = level;
            }
        }

        if let Ok(val) = std::env::var("GRID_EDGE_SAMPLES") {
            if let Ok(samples) = val.parse() {
                config.edge_samples = samples;
            }
        }

        if let Ok(val) = std::env::var("GRID_ROUND_DIGITS") {
            if let Ok(digits) = val.parse() {
                config.round_digits = digits;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.level < 0 || self.level > MAX_RESOLUTION as i32 {
            return Err(format!("level must be 0-{}", MAX_RESOLUTION));
        }

        if self.edge_samples == 0 {
            return Err("edge_samples must be > 0".to_string());
        }

        if self.round_digits == 0 || self.round_digits > 17 {
            return Err("round_digits must be 1-17".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GridConfig::default();
        assert_eq!(config.level, 10);
        assert_eq!(config.edge_samples, 2);
        assert_eq!(config.round_digits, 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GridConfig::default();
        config.level = -1;
        assert!(config.validate().is_err());

        let mut config = GridConfig::default();
        config.edge_samples = 0;
        assert!(config.validate().is_err());

        let mut config = GridConfig::default();
        config.round_digits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml() {
        let config: GridConfig = serde_yaml::from_str("level: 7\n").unwrap();
        assert_eq!(config.level, 7);
        assert_eq!(config.edge_samples, 2);
    }
}
