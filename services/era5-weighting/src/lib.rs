//! ERA5 weighting service library.
//!
//! Drives the area-weighted aggregator over a grid table and a set of
//! timestamped source files:
//!
//! ```text
//! grid.geojson ──► Grid ─────────────┐
//!                                    ├─► per zone, per timestamp ─► weighted_<ts>.geojson
//! sources/*.geojson ─► SourceBatch ──┘        (aggregate_batches)
//! ```
//!
//! The `tiles` path writes, per zone, the square source tiles an external
//! sampler fills with reanalysis values.

pub mod config;
pub mod pipeline;
pub mod sources;
pub mod tiles;

pub use config::WeightingConfig;
pub use pipeline::{weigh, write_outputs, TimestampOutput};
pub use sources::{discover, load_batches, read_grid};
