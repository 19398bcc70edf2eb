//! Reading grid tables and source files.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dggs::CellAddress;
use grid_common::{FeatureCollection, Grid, SourceBatch};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::WeightingConfig;

/// Read a grid table. The level is taken from the cell codes, which must
/// all be valid addresses at one level.
pub fn read_grid(path: &Path) -> Result<Grid> {
    let collection = read_collection(path)?;
    let crs = collection.declared_crs();
    if !crs.is_geographic() {
        bail!(
            "grid {} must be in EPSG:4326, file declares {}",
            path.display(),
            crs
        );
    }

    let mut grid = collection
        .to_grid(0)
        .with_context(|| format!("Failed to decode grid {}", path.display()))?;
    if grid.is_empty() {
        bail!("grid {} has no cells", path.display());
    }

    let mut level = None;
    for cell in grid.iter() {
        let address = CellAddress::parse(&cell.code)
            .with_context(|| format!("Bad cell code in {}", path.display()))?;
        match level {
            None => level = Some(address.level()),
            Some(l) if l != address.level() => bail!(
                "grid {} mixes levels {} and {} ({})",
                path.display(),
                l,
                address.level(),
                cell.code
            ),
            Some(_) => {}
        }
    }
    grid.level = level.unwrap_or_default();

    debug!(path = %path.display(), cells = grid.len(), level = grid.level, "Read grid");
    Ok(grid)
}

/// Source files under `path`: the path itself when it is a file, otherwise
/// every `.geojson`/`.json` file below it in path order.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("source path {} does not exist", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to scan {}", path.display()))?;
        if entry.file_type().is_file() && is_geojson(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no GeoJSON files under {}", path.display());
    }
    Ok(files)
}

fn is_geojson(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("geojson") || e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read source batches from every file, one batch per timestamp and CRS.
///
/// Features sharing both across files are merged in file order. Files in
/// different CRSs at one timestamp, such as per-zone files each in their own
/// UTM zone, stay separate batches. Each file's CRS is the configured
/// override or the one the file declares. Batches come out in timestamp
/// order, then in order of first appearance.
pub fn load_batches(files: &[PathBuf], config: &WeightingConfig) -> Result<Vec<SourceBatch>> {
    let attributes = config.attribute_names();
    let mut merged: BTreeMap<DateTime<Utc>, Vec<SourceBatch>> = BTreeMap::new();

    for path in files {
        let collection = read_collection(path)?;
        let crs = config
            .source_crs
            .clone()
            .unwrap_or_else(|| collection.declared_crs());
        let batches = collection
            .to_source_batches(&crs, &config.timestamp_property, &attributes)
            .with_context(|| format!("Failed to decode sources {}", path.display()))?;

        debug!(
            path = %path.display(),
            crs = %crs,
            features = collection.features.len(),
            batches = batches.len(),
            "Read source file"
        );

        for batch in batches {
            let slot = merged.entry(batch.timestamp).or_default();
            match slot.iter_mut().find(|b| b.crs == batch.crs) {
                Some(existing) => existing.features.extend(batch.features),
                None => slot.push(batch),
            }
        }
    }

    Ok(merged.into_values().flatten().collect())
}

fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    FeatureCollection::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
