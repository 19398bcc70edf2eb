//! The DGGS capability consumed by grid generation.

use crate::{RegionBounds, Resolution};

/// A cell as produced by a DGGS: its address and raw boundary samples.
///
/// Boundary samples are unrounded [lon, lat] pairs and the ring is not yet
/// closed; callers normalise them into `grid_common::Cell`.
#[derive(Debug, Clone, PartialEq)]
pub struct DggsCell {
    pub code: String,
    pub boundary: Vec<[f64; 2]>,
}

/// A hierarchical discrete global grid.
///
/// Abstracts over the grid system so generation and its tests do not depend
/// on one particular DGGS.
pub trait Dggs: Send + Sync {
    /// Enumerate the cells at `resolution` intersecting a region.
    ///
    /// # Arguments
    /// * `region` - Geographic rectangle to cover
    /// * `resolution` - Subdivision level
    ///
    /// # Returns
    /// Cells in address order. Every cell whose footprint overlaps the
    /// region is included, so the union of the cells covers the region.
    fn cells(&self, region: &RegionBounds, resolution: Resolution) -> Vec<DggsCell>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
