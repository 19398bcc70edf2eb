//! Square source tiles over each zone of a grid.

use anyhow::{bail, Context, Result};
use area_weighting::tiling::tiles_for_grid;
use grid_common::geojson::ZONE_PROPERTY;
use grid_common::{Crs, Feature, FeatureCollection, Geometry, Grid};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::WeightingConfig;

/// Tiles of one zone, in that zone's working CRS.
#[derive(Debug, Clone)]
pub struct ZoneTiles {
    pub zone: String,
    pub crs: Crs,
    pub collection: FeatureCollection,
}

impl ZoneTiles {
    /// Output file name, e.g. `tiles_las-rosas.geojson`.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .zone
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("tiles_{}.geojson", safe)
    }
}

/// Tile every zone on its own. Each zone's extent is projected to the UTM
/// zone of its own centre (or the configured working CRS), and tiles carry
/// `zone` and `tile` properties, numbered in generation order per zone.
pub fn zone_tiles(grid: &Grid, config: &WeightingConfig) -> Result<Vec<ZoneTiles>> {
    let zones = grid.zones();
    if zones.is_empty() {
        bail!("grid has no zones to tile");
    }

    let mut tiled = Vec::with_capacity(zones.len());
    for label in zones {
        let sub_grid = grid.for_zone(label);
        let (crs, tiles) = tiles_for_grid(&sub_grid, config.tile_size, &config.aggregation)
            .with_context(|| format!("Failed to tile zone '{}'", label))?;

        let features = tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                Feature::new(Geometry::from_polygon(tile))
                    .with_property(ZONE_PROPERTY, label)
                    .with_property("tile", i)
            })
            .collect();

        info!(
            zone = label,
            crs = %crs,
            size = config.tile_size,
            tiles = tiles.len(),
            "Tiled zone"
        );
        tiled.push(ZoneTiles {
            zone: label.to_string(),
            collection: FeatureCollection::new(features).with_crs(&crs),
            crs,
        });
    }
    Ok(tiled)
}

/// Write one tiles file per zone into `dir`. Returns the files written.
pub fn write_tiles(dir: &Path, grid: &Grid, config: &WeightingConfig) -> Result<Vec<PathBuf>> {
    let tiled = zone_tiles(grid, config)?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(tiled.len());
    for zone in &tiled {
        let path = dir.join(zone.file_name());
        fs::write(&path, zone.collection.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
