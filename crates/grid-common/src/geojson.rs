//! GeoJSON geometry+attribute tables.
//!
//! Cells, zones, source batches and weighted outputs are persisted as
//! FeatureCollections. The legacy named `crs` member written by common GIS
//! tools is read and written so projected source batches survive a round
//! trip; without it, RFC 7946 implies WGS84.
//!
//! See: <https://datatracker.ietf.org/doc/html/rfc7946>

use chrono::{DateTime, Utc};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::time::{format_timestamp, timestamp_from_value};
use crate::{
    Cell, Crs, Grid, GridCommonError, Result, SourceBatch, SourceFeature, WeightedCell, Zone,
};

/// Property holding the cell code.
pub const CODE_PROPERTY: &str = "code";
/// Property holding the zone label.
pub const ZONE_PROPERTY: &str = "zone";
/// Property holding the batch timestamp.
pub const TIMESTAMP_PROPERTY: &str = "date_time";

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Legacy named CRS member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<NamedCrs>,

    /// Array of features.
    pub features: Vec<Feature>,
}

/// `{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::32614"}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedCrs {
    #[serde(rename = "type")]
    pub type_: String,
    pub properties: NamedCrsProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedCrsProperties {
    pub name: String,
}

impl FeatureCollection {
    /// Create a new FeatureCollection.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            crs: None,
            features,
        }
    }

    /// Declare the CRS of the coordinates. WGS84 is left implicit.
    pub fn with_crs(mut self, crs: &Crs) -> Self {
        self.crs = if crs.is_geographic() {
            None
        } else {
            Some(NamedCrs {
                type_: "name".to_string(),
                properties: NamedCrsProperties { name: crs.urn() },
            })
        };
        self
    }

    /// CRS declared by the file, WGS84 when absent.
    pub fn declared_crs(&self) -> Crs {
        self.crs
            .as_ref()
            .map(|c| Crs::parse(&c.properties.name))
            .unwrap_or(Crs::Wgs84)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// One polygon feature per cell with `code` and `zone` properties.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        Self::new(cells.into_iter().map(Feature::from_cell).collect())
    }

    /// One feature per weighted cell.
    pub fn from_weighted<'a>(cells: impl IntoIterator<Item = &'a WeightedCell>) -> Self {
        Self::new(cells.into_iter().map(Feature::from_weighted).collect())
    }

    /// Decode a grid table written by [`FeatureCollection::from_cells`].
    ///
    /// Cell rings must be closed as written, with at least four positions.
    pub fn to_grid(&self, level: u8) -> Result<Grid> {
        let mut cells = Vec::with_capacity(self.features.len());
        for (index, feature) in self.features.iter().enumerate() {
            let code = feature.string_property(CODE_PROPERTY, index)?;
            let zone = feature.string_property(ZONE_PROPERTY, index)?;
            let cell = Cell::new(code, zone, feature.exterior_ring(index)?);
            if !cell.is_closed() {
                return Err(GridCommonError::invalid_geometry(format!(
                    "feature {} ({}) has an open or degenerate ring",
                    index, cell.code
                )));
            }
            cells.push(cell);
        }
        Ok(Grid::new(level, cells))
    }

    /// Decode zone polygons labelled by `label_property`.
    pub fn to_zones(&self, label_property: &str) -> Result<Vec<Zone>> {
        self.features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let label = feature.string_property(label_property, index)?;
                Ok(Zone::new(label, feature.multi_polygon(index)?))
            })
            .collect()
    }

    /// Decode source features and group them into one batch per timestamp.
    ///
    /// With an empty `attributes` list every numeric property except the
    /// timestamp becomes an attribute. Listed attributes that are absent or
    /// null are left out of the feature (treated as missing downstream).
    /// Multipolygons are split into one source feature per part.
    pub fn to_source_batches(
        &self,
        crs: &Crs,
        timestamp_property: &str,
        attributes: &[String],
    ) -> Result<Vec<SourceBatch>> {
        let mut grouped: BTreeMap<DateTime<Utc>, Vec<SourceFeature>> = BTreeMap::new();

        for (index, feature) in self.features.iter().enumerate() {
            let ts_value = feature
                .properties
                .get(timestamp_property)
                .ok_or_else(|| GridCommonError::missing_property(timestamp_property, index))?;
            let timestamp = timestamp_from_value(ts_value)?;

            let mut values = BTreeMap::new();
            if attributes.is_empty() {
                for (key, value) in &feature.properties {
                    if key == timestamp_property {
                        continue;
                    }
                    if let Some(v) = value.as_f64() {
                        values.insert(key.clone(), v);
                    }
                }
            } else {
                for name in attributes {
                    match feature.properties.get(name) {
                        None | Some(Value::Null) => {}
                        Some(value) => {
                            let v = value.as_f64().ok_or_else(|| {
                                GridCommonError::invalid_property(name, index, "expected a number")
                            })?;
                            values.insert(name.clone(), v);
                        }
                    }
                }
            }

            for polygon in feature.multi_polygon(index)? {
                grouped.entry(timestamp).or_default().push(SourceFeature {
                    polygon,
                    attributes: values.clone(),
                    timestamp,
                });
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(ts, features)| SourceBatch::new(crs.clone(), ts, features))
            .collect())
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Optional feature identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// The geometry of this feature (null geometries are allowed).
    pub geometry: Option<Geometry>,

    /// Attribute values.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn from_cell(cell: &Cell) -> Self {
        Feature::new(Geometry::Polygon {
            coordinates: vec![cell.boundary.clone()],
        })
        .with_property(CODE_PROPERTY, cell.code.clone())
        .with_property(ZONE_PROPERTY, cell.zone.clone())
    }

    /// Cell geometry plus `<attr>_weighted`, `<attr>_weight` and `coverage`.
    ///
    /// Missing means are written as JSON null.
    pub fn from_weighted(weighted: &WeightedCell) -> Self {
        let mut feature = Feature::from_cell(&weighted.cell)
            .with_property(TIMESTAMP_PROPERTY, format_timestamp(&weighted.timestamp))
            .with_property("coverage", weighted.coverage);
        for (name, value) in &weighted.values {
            feature = feature
                .with_property(format!("{}_weighted", name), optional_number(value.mean))
                .with_property(format!("{}_weight", name), value.weight);
        }
        feature
    }

    pub fn from_source(source: &SourceFeature) -> Self {
        let mut feature = Feature::new(Geometry::from_polygon(&source.polygon))
            .with_property(TIMESTAMP_PROPERTY, format_timestamp(&source.timestamp));
        for (name, value) in &source.attributes {
            feature = feature.with_property(name.clone(), optional_number(Some(*value)));
        }
        feature
    }

    fn string_property(&self, key: &str, index: usize) -> Result<String> {
        match self.properties.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(_) => Err(GridCommonError::invalid_property(key, index, "expected a string")),
            None => Err(GridCommonError::missing_property(key, index)),
        }
    }

    fn multi_polygon(&self, index: usize) -> Result<MultiPolygon<f64>> {
        match &self.geometry {
            Some(geometry) => geometry.to_multi_polygon(),
            None => Err(GridCommonError::invalid_geometry(format!(
                "feature {} has no geometry",
                index
            ))),
        }
    }

    fn single_polygon(&self, index: usize) -> Result<Polygon<f64>> {
        let mut parts = self.multi_polygon(index)?.0;
        if parts.len() != 1 {
            return Err(GridCommonError::invalid_geometry(format!(
                "feature {} has {} polygon parts, expected 1",
                index,
                parts.len()
            )));
        }
        Ok(parts.remove(0))
    }

    /// Exterior ring of a single-part polygon, exactly as stored.
    fn exterior_ring(&self, index: usize) -> Result<Vec<[f64; 2]>> {
        self.single_polygon(index)?;
        let ring = match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => coordinates.first(),
            Some(Geometry::MultiPolygon { coordinates }) => {
                coordinates.first().and_then(|rings| rings.first())
            }
            _ => None,
        };
        ring.cloned().ok_or_else(|| {
            GridCommonError::invalid_geometry(format!("feature {} has no exterior ring", index))
        })
    }
}

/// Finite numbers as JSON numbers, anything else as null.
pub fn optional_number(value: Option<f64>) -> Value {
    value
        .filter(|v| v.is_finite())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// GeoJSON geometry types used by the tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A point geometry.
    Point {
        /// Coordinates as [longitude, latitude].
        coordinates: [f64; 2],
    },

    /// A polygon geometry.
    Polygon {
        /// Array of linear rings (first is exterior, rest are holes).
        coordinates: Vec<Vec<[f64; 2]>>,
    },

    /// A multipolygon geometry.
    MultiPolygon {
        /// Array of polygons, each an array of linear rings.
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        Geometry::Polygon {
            coordinates: polygon_rings(polygon),
        }
    }

    pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon {
            coordinates: multi.iter().map(polygon_rings).collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Polygon or MultiPolygon as a `geo` multipolygon.
    pub fn to_multi_polygon(&self) -> Result<MultiPolygon<f64>> {
        match self {
            Geometry::Polygon { coordinates } => Ok(MultiPolygon::new(vec![rings_to_polygon(
                coordinates,
            )?])),
            Geometry::MultiPolygon { coordinates } => Ok(MultiPolygon::new(
                coordinates
                    .iter()
                    .map(|rings| rings_to_polygon(rings))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(GridCommonError::UnsupportedGeometry {
                found: other.type_name().to_string(),
                expected: "Polygon or MultiPolygon".to_string(),
            }),
        }
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

fn rings_to_polygon(rings: &[Vec<[f64; 2]>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        if ring.len() < 4 {
            return Err(GridCommonError::invalid_geometry(format!(
                "linear ring has {} positions, expected at least 4",
                ring.len()
            )));
        }
        if ring.iter().flatten().any(|v| !v.is_finite()) {
            return Err(GridCommonError::invalid_geometry("non-finite coordinate"));
        }
        Ok(LineString::new(
            ring.iter().map(|p| Coord { x: p[0], y: p[1] }).collect(),
        ))
    });

    let exterior = rings
        .next()
        .ok_or_else(|| GridCommonError::invalid_geometry("polygon has no rings"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}
