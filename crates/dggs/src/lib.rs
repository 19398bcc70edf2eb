//! Hierarchical equal-area grid generation.
//!
//! Builds rHEALPix DGGS cells over the bounding box of each zone and hands
//! them out as closed, rounded `grid_common::Cell` rings.
//!
//! # Architecture
//!
//! ```text
//! zones ──► GridGenerator::generate_for_zones(zones, level)
//!                │
//!                ├─► RegionBounds::from_corners(nw, se)   (validation)
//!                │
//!                ├─► Dggs::cells(region, resolution)      (capability)
//!                │        └─► RhealpixDggs: recursive descent from the six
//!                │            faces, pruned by geographic footprint
//!                │
//!                └─► Cell::from_samples(..)               (round + close)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dggs::{GridConfig, GridGenerator};
//! use grid_common::LonLat;
//!
//! let generator = GridGenerator::new(GridConfig::default());
//! let grid = generator.generate(
//!     "zona-1",
//!     LonLat::new(-94.81, 35.97),
//!     LonLat::new(-94.75, 35.91),
//!     10,
//! )?;
//! ```

pub mod address;
pub mod capability;
pub mod config;
pub mod error;
pub mod generator;
pub mod region;
pub mod rhealpix;

pub use address::CellAddress;
pub use capability::{Dggs, DggsCell};
pub use config::GridConfig;
pub use error::{DggsError, Result};
pub use generator::GridGenerator;
pub use region::{RegionBounds, Resolution, MAX_RESOLUTION};
pub use rhealpix::RhealpixDggs;
