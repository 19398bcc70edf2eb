//! ERA5 weighting configuration.

use anyhow::{Context, Result};
use area_weighting::{AggregationConfig, MeteoAttributes};
use grid_common::geojson::TIMESTAMP_PROPERTY;
use grid_common::Crs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Side of the square source tiles, in working CRS meters.
pub const DEFAULT_TILE_SIZE: f64 = 1035.0;

/// Top-level weighting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingConfig {
    /// Aggregator settings
    pub aggregation: AggregationConfig,

    /// Attributes to aggregate; empty selects the meteorological set
    pub attributes: Vec<String>,

    /// Attribute names the derived quantities read
    pub meteo: MeteoAttributes,

    /// Source property holding the timestamp
    pub timestamp_property: String,

    /// CRS of the source files, overriding what they declare
    pub source_crs: Option<Crs>,

    /// Append wind, humidity and VPD fields to the output
    pub derived: bool,

    /// Tile side for the `tiles` command
    pub tile_size: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationConfig::default(),
            attributes: Vec::new(),
            meteo: MeteoAttributes::default(),
            timestamp_property: TIMESTAMP_PROPERTY.to_string(),
            source_crs: None,
            derived: true,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl WeightingConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            aggregation: AggregationConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = env::var("WEIGHTING_ATTRIBUTES") {
            config.attributes = split_list(&val);
        }

        if let Ok(val) = env::var("WEIGHTING_TIMESTAMP_PROPERTY") {
            if !val.trim().is_empty() {
                config.timestamp_property = val.trim().to_string();
            }
        }

        if let Ok(val) = env::var("WEIGHTING_SOURCE_CRS") {
            if !val.trim().is_empty() {
                config.source_crs = Some(Crs::parse(val.trim()));
            }
        }

        if let Ok(val) = env::var("WEIGHTING_DERIVED") {
            config.derived = val == "true" || val == "1";
        }

        if let Ok(val) = env::var("WEIGHTING_TILE_SIZE") {
            if let Ok(size) = val.parse() {
                config.tile_size = size;
            }
        }

        config
    }

    /// YAML file when given, environment otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(path),
            None => Ok(Self::from_env()),
        }
    }

    /// Attributes the aggregator runs over.
    pub fn attribute_names(&self) -> Vec<String> {
        if self.attributes.is_empty() {
            self.meteo.names()
        } else {
            self.attributes.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.aggregation.validate()?;

        if self.timestamp_property.trim().is_empty() {
            return Err("timestamp_property must not be empty".to_string());
        }

        if let Some(crs) = &self.source_crs {
            if !crs.is_supported() {
                return Err(format!("source_crs {} is not supported", crs));
            }
        }

        if !(self.tile_size > 0.0 && self.tile_size.is_finite()) {
            return Err("tile_size must be a finite value > 0".to_string());
        }

        Ok(())
    }
}

/// Comma separated names, blanks dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WeightingConfig::default();
        assert_eq!(config.timestamp_property, "date_time");
        assert!(config.derived);
        assert_eq!(config.tile_size, 1035.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attribute_names_default_to_meteo() {
        let config = WeightingConfig::default();
        assert_eq!(config.attribute_names(), MeteoAttributes::default().names());

        let config = WeightingConfig {
            attributes: vec!["total_precipitation".to_string()],
            ..Default::default()
        };
        assert_eq!(config.attribute_names(), vec!["total_precipitation"]);
    }

    #[test]
    fn test_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "attributes: [temperature_2m]\nsource_crs: EPSG:32719\nderived: false\naggregation:\n  overflow_epsilon: 0.001"
        )
        .unwrap();

        let config = WeightingConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.attributes, vec!["temperature_2m"]);
        assert_eq!(config.source_crs, Some(Crs::parse("EPSG:32719")));
        assert!(!config.derived);
        assert_eq!(config.aggregation.overflow_epsilon, 0.001);
        assert_eq!(config.tile_size, 1035.0);
    }

    #[test]
    fn test_validate() {
        let config = WeightingConfig {
            tile_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WeightingConfig {
            source_crs: Some(Crs::parse("EPSG:3857")),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = WeightingConfig::default();
        config.aggregation.working_crs = Some(Crs::Wgs84);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
