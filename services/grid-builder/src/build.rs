//! Zones file in, grid file out.

use anyhow::{bail, Context, Result};
use dggs::{GridConfig, GridGenerator};
use grid_common::{FeatureCollection, Grid, Zone};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::BuilderConfig;

/// Read zone polygons labelled by `property` from a GeoJSON file.
///
/// Zones must be in geographic coordinates.
pub fn read_zones(path: &Path, property: &str) -> Result<Vec<Zone>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read zones {}", path.display()))?;
    let collection = FeatureCollection::from_json(&text)
        .with_context(|| format!("Failed to parse zones {}", path.display()))?;

    let crs = collection.declared_crs();
    if !crs.is_geographic() {
        bail!(
            "zones in {} must be in EPSG:4326, file declares {}",
            path.display(),
            crs
        );
    }

    let zones = collection
        .to_zones(property)
        .with_context(|| format!("Failed to decode zones {}", path.display()))?;
    if zones.is_empty() {
        bail!("{} contains no zones", path.display());
    }

    debug!(path = %path.display(), zones = zones.len(), "Read zones");
    Ok(zones)
}

/// Generate the grid over every zone, in zone order.
pub fn build_grid(zones: &[Zone], config: &GridConfig) -> Result<Grid> {
    let generator = GridGenerator::new(config.clone());
    let grid = generator
        .generate_for_zones(zones, config.level)
        .context("Grid generation failed")?;
    Ok(grid)
}

/// Write the grid as a GeoJSON table, creating parent directories.
pub fn write_grid(path: &Path, grid: &Grid) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = FeatureCollection::from_cells(grid.iter()).to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write grid {}", path.display()))?;
    Ok(())
}

/// Read zones, generate, write. Returns the grid that was written.
pub fn run(zones_path: &Path, output: &Path, config: &BuilderConfig) -> Result<Grid> {
    let zones = read_zones(zones_path, &config.zone_property)?;
    let grid = build_grid(&zones, &config.grid)?;
    write_grid(output, &grid)?;

    info!(
        zones = zones.len(),
        cells = grid.len(),
        level = grid.level,
        output = %output.display(),
        "Wrote grid"
    );
    Ok(grid)
}
