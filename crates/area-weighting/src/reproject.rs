//! Reprojection of cells and source features into the working CRS.

use geo::{Coord, MapCoords, Polygon};
use grid_common::{BoundingBox, Crs, Grid, LonLat, SourceBatch};
use projection::Transformer;
use rayon::prelude::*;

use crate::{AggregationConfig, AggregationError, Result};

/// UTM zone of the centre of a geographic extent.
pub fn estimate_utm(bounds: &BoundingBox) -> Crs {
    Crs::utm_for(LonLat::from(bounds.center()))
}

/// Planar CRS areas are computed in.
///
/// Uses the configured CRS when present, otherwise the UTM zone of the grid
/// centre. Geographic and unsupported CRSs are rejected since areas in
/// degrees are meaningless.
pub fn working_crs(grid: &Grid, config: &AggregationConfig) -> Result<Crs> {
    let crs = match &config.working_crs {
        Some(crs) => crs.clone(),
        None => {
            let bounds = grid
                .bounds()
                .ok_or_else(|| AggregationError::empty_input("target grid has no extent"))?;
            estimate_utm(&bounds)
        }
    };

    if crs.is_geographic() {
        return Err(AggregationError::crs_mismatch(format!(
            "working CRS {} is geographic; areas need a projected CRS",
            crs
        )));
    }
    if !crs.is_supported() {
        return Err(AggregationError::crs_mismatch(format!(
            "working CRS {} is not supported",
            crs
        )));
    }
    Ok(crs)
}

/// Transform every vertex of a polygon.
pub fn project_polygon(polygon: &Polygon<f64>, transformer: &Transformer) -> Result<Polygon<f64>> {
    polygon
        .try_map_coords(|c: Coord<f64>| {
            transformer
                .transform(c.x, c.y)
                .map(|(x, y)| Coord { x, y })
        })
        .map_err(AggregationError::from)
}

/// Grid cells (EPSG:4326) in `target`, in grid order.
pub fn project_cells(grid: &Grid, target: &Crs) -> Result<Vec<Polygon<f64>>> {
    let transformer = Transformer::new(&Crs::Wgs84, target)?;
    grid.cells
        .par_iter()
        .map(|cell| project_polygon(&cell.polygon(), &transformer))
        .collect()
}

/// Source polygons in `target`, in batch order.
pub fn project_sources(batch: &SourceBatch, target: &Crs) -> Result<Vec<Polygon<f64>>> {
    if !batch.crs.is_supported() {
        return Err(AggregationError::crs_mismatch(format!(
            "source CRS {} is not supported",
            batch.crs
        )));
    }
    let transformer = Transformer::new(&batch.crs, target)?;
    batch
        .features
        .par_iter()
        .map(|feature| project_polygon(&feature.polygon, &transformer))
        .collect()
}
