//! Grid generation over zones.

use grid_common::{Cell, Grid, LonLat, Zone};
use tracing::{debug, info, warn};

use crate::{Dggs, DggsError, GridConfig, RegionBounds, Resolution, Result, RhealpixDggs};

/// Builds coded cell grids over rectangular regions.
pub struct GridGenerator<D = RhealpixDggs> {
    dggs: D,
    config: GridConfig,
}

impl GridGenerator<RhealpixDggs> {
    /// Generator backed by rHEALPix with the configured edge sampling.
    pub fn new(config: GridConfig) -> Self {
        Self {
            dggs: RhealpixDggs::new(config.edge_samples),
            config,
        }
    }
}

impl<D: Dggs> GridGenerator<D> {
    pub fn with_dggs(dggs: D, config: GridConfig) -> Self {
        Self { dggs, config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Generate the cells covering the rectangle `nw`..`se` at `level`.
    ///
    /// Every cell is tagged with `zone`. Rings are rounded to the configured
    /// digits and force-closed; rings left with fewer than three distinct
    /// vertices are dropped.
    pub fn generate(&self, zone: &str, nw: LonLat, se: LonLat, level: i32) -> Result<Grid> {
        let resolution = Resolution::new(level)?;
        let region = RegionBounds::from_corners(nw, se)?;

        let raw = self.dggs.cells(&region, resolution);
        let mut cells = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;

        for dggs_cell in raw {
            match Cell::from_samples(&dggs_cell.code, zone, &dggs_cell.boundary, self.config.round_digits)
            {
                Some(cell) => cells.push(cell),
                None => {
                    warn!(
                        zone = zone,
                        code = %dggs_cell.code,
                        samples = dggs_cell.boundary.len(),
                        "Dropped degenerate cell"
                    );
                    dropped += 1;
                }
            }
        }

        info!(
            zone = zone,
            level = resolution.level(),
            dggs = self.dggs.name(),
            cells = cells.len(),
            dropped = dropped,
            "Generated grid"
        );

        Ok(Grid::new(resolution.level(), cells))
    }

    /// Generate over the bounding box of each zone and concatenate the
    /// results in zone order.
    pub fn generate_for_zones(&self, zones: &[Zone], level: i32) -> Result<Grid> {
        let resolution = Resolution::new(level)?;
        let mut grid = Grid::new(resolution.level(), Vec::new());

        for zone in zones {
            let (nw, se) = zone.corners().ok_or_else(|| {
                DggsError::invalid_region(format!("zone '{}' has no geometry", zone.label))
            })?;
            debug!(
                zone = %zone.label,
                nw_lon = nw.lon,
                nw_lat = nw.lat,
                se_lon = se.lon,
                se_lat = se.lat,
                "Zone bounds"
            );
            grid.extend(self.generate(&zone.label, nw, se, level)?);
        }

        Ok(grid)
    }
}
