//! Grid builder service library.
//!
//! Reads zone polygons from GeoJSON, generates the rHEALPix cells covering
//! each zone's bounding box and writes them back out as a GeoJSON grid
//! table with `code` and `zone` properties.

pub mod build;
pub mod config;

pub use config::BuilderConfig;
