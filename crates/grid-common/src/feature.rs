//! Source features and weighted output records.

use chrono::{DateTime, Utc};
use geo::Polygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Cell, Crs};

/// A coarse source polygon carrying measured values for one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeature {
    pub polygon: Polygon<f64>,
    pub attributes: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl SourceFeature {
    pub fn new(polygon: Polygon<f64>, timestamp: DateTime<Utc>) -> Self {
        Self {
            polygon,
            attributes: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Attribute value, treating non-finite values as absent.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied().filter(|v| v.is_finite())
    }
}

/// Source features sharing one CRS and one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    pub crs: Crs,
    pub timestamp: DateTime<Utc>,
    pub features: Vec<SourceFeature>,
}

impl SourceBatch {
    pub fn new(crs: Crs, timestamp: DateTime<Utc>, features: Vec<SourceFeature>) -> Self {
        Self {
            crs,
            timestamp,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Area-weighted value of one attribute on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    /// Weighted mean, `None` when nothing with this attribute overlaps the cell.
    pub mean: Option<f64>,
    /// Sum of `intersection_area / cell_area` over contributing records.
    pub weight: f64,
}

impl WeightedValue {
    pub fn missing() -> Self {
        Self {
            mean: None,
            weight: 0.0,
        }
    }
}

/// A target cell enriched with area-weighted attributes for one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCell {
    pub cell: Cell,
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, WeightedValue>,
    /// Sum of weights over every intersection record of the cell.
    pub coverage: f64,
}

impl WeightedCell {
    /// Weighted mean of an attribute, `None` when missing.
    pub fn mean(&self, attribute: &str) -> Option<f64> {
        self.values.get(attribute).and_then(|v| v.mean)
    }

    pub fn weight(&self, attribute: &str) -> f64 {
        self.values.get(attribute).map(|v| v.weight).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geo::polygon;

    #[test]
    fn test_non_finite_attribute_is_absent() {
        let ts = Utc.with_ymd_and_hms(2025, 4, 18, 8, 0, 0).unwrap();
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let feature = SourceFeature::new(square, ts)
            .with_attribute("temperature_2m", 290.0)
            .with_attribute("dewpoint_temperature_2m", f64::NAN);

        assert_eq!(feature.value("temperature_2m"), Some(290.0));
        assert_eq!(feature.value("dewpoint_temperature_2m"), None);
        assert_eq!(feature.value("u_component_of_wind_10m"), None);
    }
}
