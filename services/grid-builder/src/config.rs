//! Grid builder configuration.

use anyhow::{Context, Result};
use dggs::GridConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Property the zones file labels its polygons with.
pub const DEFAULT_ZONE_PROPERTY: &str = "zona";

/// Top-level grid builder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Zone label property in the zones file
    pub zone_property: String,

    /// Grid generation settings
    pub grid: GridConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            zone_property: DEFAULT_ZONE_PROPERTY.to_string(),
            grid: GridConfig::default(),
        }
    }
}

impl BuilderConfig {
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
        Self {
            zone_property: env::var("GRID_ZONE_PROPERTY")
                .unwrap_or_else(|_| DEFAULT_ZONE_PROPERTY.to_string()),
            grid: GridConfig::from_env(),
        }
    }

    /// YAML file when given, environment otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(path),
            None => Ok(Self::from_env()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.zone_property.trim().is_empty() {
            return Err("zone_property must not be empty".to_string());
        }
        self.grid.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.zone_property, "zona");
        assert_eq!(config.grid.level, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zone_property: name\ngrid:\n  level: 8").unwrap();

        let config = BuilderConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.zone_property, "name");
        assert_eq!(config.grid.level, 8);
        assert_eq!(config.grid.edge_samples, 2);
    }

    #[test]
    fn test_from_yaml_missing_file() {
        let err = BuilderConfig::from_yaml("/nonexistent/grid-builder.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_validate_rejects_blank_property() {
        let config = BuilderConfig {
            zone_property: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_delegates_to_grid() {
        let mut config = BuilderConfig::default();
        config.grid.level = 16;
        assert!(config.validate().is_err());
    }
}
