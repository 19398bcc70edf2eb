//! Area-weighted aggregation of source polygons onto grid cells.
//!
//! For every target cell and attribute, the aggregated value is the mean of
//! the overlapping source values weighted by `area(intersection) /
//! area(cell)`, computed in a planar working CRS.
//!
//! # Pipeline
//!
//! ```text
//! Grid (EPSG:4326) ─┐
//!                   ├─► reproject to working CRS (UTM by default)
//! SourceBatch ──────┘          │
//!                              ▼
//!                   R-tree over source envelopes
//!                              │
//!                              ▼
//!                   exact polygon intersections per cell
//!                              │
//!                              ▼
//!                   per-attribute weighted means (left join)
//!                              │
//!                              ▼
//!                   derived meteorology (optional)
//! ```
//!
//! Aggregation is a pure function of its inputs; independent timestamps can
//! be run in parallel with [`aggregate_batches`].

pub mod config;
pub mod derived;
pub mod error;
pub mod overlay;
pub mod reproject;
pub mod tiling;
pub mod weighting;
pub mod zones;

pub use config::AggregationConfig;
pub use derived::{DerivedRecord, MeteoAttributes};
pub use error::{AggregationError, Result, WeightOverflowWarning};
pub use overlay::{Overlap, SourceIndex};
pub use tiling::square_tiles;
pub use weighting::{aggregate, aggregate_batches, AggregationOutput};
pub use zones::{tag_by_zone, zone_memberships};
