//! Common types shared across the wildfire-grid crates and services.

pub mod bbox;
pub mod cell;
pub mod crs;
pub mod error;
pub mod feature;
pub mod geojson;
pub mod time;
pub mod zone;

pub use bbox::{BoundingBox, LonLat};
pub use cell::{round_coord, Cell, Grid, ROUND_DIGITS};
pub use crs::{Crs, Hemisphere};
pub use error::{GridCommonError, Result};
pub use feature::{SourceBatch, SourceFeature, WeightedCell, WeightedValue};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use zone::Zone;
