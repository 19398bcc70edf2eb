//! Square source tiles over a projected extent.
//!
//! Reanalysis values are sampled per tile. Tiles start at the extent's
//! lower-left corner and overhang its upper and right edges, so cells at the
//! border of a zone are always fully covered.

use geo::Polygon;
use grid_common::{BoundingBox, Crs, Grid};
use tracing::debug;

use crate::reproject::{project_cells, working_crs};
use crate::{AggregationConfig, AggregationError, Result};

/// Upper bound on the tiles one call may produce.
pub const MAX_TILES: usize = 4_000_000;

/// Cover `bounds` with `size`-sided squares.
///
/// Tiles are produced column by column from west to east, each column from
/// south to north. Each origin is `min + i * size`, so rounding never stalls
/// or drifts the walk. Sizes that would need more than [`MAX_TILES`] tiles are
/// rejected before anything is allocated.
pub fn square_tiles(bounds: &BoundingBox, size: f64) -> Result<Vec<Polygon<f64>>> {
    if !(size > 0.0 && size.is_finite()) {
        return Err(AggregationError::empty_input(format!(
            "tile size must be positive, got {}",
            size
        )));
    }

    let columns = tile_count(bounds.max_x - bounds.min_x, size);
    let rows = tile_count(bounds.max_y - bounds.min_y, size);
    let total = columns * rows;
    if !(total <= MAX_TILES as f64) {
        return Err(AggregationError::TooManyTiles {
            size,
            count: total,
            max: MAX_TILES,
        });
    }
    let (columns, rows) = (columns as usize, rows as usize);

    let mut tiles = Vec::with_capacity(columns * rows);
    for i in 0..columns {
        let x_left = bounds.min_x + i as f64 * size;
        for j in 0..rows {
            let y_bottom = bounds.min_y + j as f64 * size;
            tiles.push(
                geo::Rect::new((x_left, y_bottom), (x_left + size, y_bottom + size)).to_polygon(),
            );
        }
    }
    Ok(tiles)
}

/// Squares needed along a span, as a float so huge counts stay comparable.
fn tile_count(span: f64, size: f64) -> f64 {
    if span > 0.0 {
        (span / size).ceil()
    } else {
        0.0
    }
}

/// Tiles covering a grid's extent in its working CRS.
///
/// Returns the CRS the tiles are expressed in alongside them.
pub fn tiles_for_grid(
    grid: &Grid,
    size: f64,
    config: &AggregationConfig,
) -> Result<(Crs, Vec<Polygon<f64>>)> {
    if grid.is_empty() {
        return Err(AggregationError::empty_input("target grid has no cells"));
    }
    let crs = working_crs(grid, config)?;
    let projected = project_cells(grid, &crs)?;

    let bounds = BoundingBox::from_points(
        projected
            .iter()
            .flat_map(|p| p.exterior().coords().map(|c| [c.x, c.y])),
    )
    .ok_or_else(|| AggregationError::empty_input("target grid has no extent"))?;

    let tiles = square_tiles(&bounds, size)?;
    debug!(
        working_crs = %crs,
        size = size,
        tiles = tiles.len(),
        "Tiled grid extent"
    );
    Ok((crs, tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, BoundingRect};
    use test_utils::{bbox, bbox_zone};

    #[test]
    fn test_tiles_cover_extent() {
        let bounds = BoundingBox::new(0.0, 0.0, 2500.0, 1000.0);
        let tiles = square_tiles(&bounds, 1000.0).unwrap();
        // 3 columns x 1 row
        assert_eq!(tiles.len(), 3);
        assert!(tiles.iter().all(|t| (t.unsigned_area() - 1_000_000.0).abs() < 1e-6));

        let last = tiles[2].bounding_rect().unwrap();
        assert_eq!(last.min().x, 2000.0);
        assert_eq!(last.max().x, 3000.0);
    }

    #[test]
    fn test_column_major_order() {
        let bounds = BoundingBox::new(0.0, 0.0, 20.0, 20.0);
        let tiles = square_tiles(&bounds, 10.0).unwrap();
        let origins: Vec<(f64, f64)> = tiles
            .iter()
            .map(|t| {
                let r = t.bounding_rect().unwrap();
                (r.min().x, r.min().y)
            })
            .collect();
        assert_eq!(origins, vec![(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn test_non_positive_size() {
        let bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(square_tiles(&bounds, 0.0), Err(AggregationError::EmptyInput(_))));
        assert!(square_tiles(&bounds, -5.0).is_err());
        assert!(square_tiles(&bounds, f64::NAN).is_err());
    }

    #[test]
    fn test_tiny_size_rejected_before_allocating() {
        // At UTM northings 6.3e6 + 1e-10 == 6.3e6, so stepping would stall
        let bounds = BoundingBox::new(340_000.0, 6_290_000.0, 356_000.0, 6_306_000.0);
        match square_tiles(&bounds, 1e-10) {
            Err(AggregationError::TooManyTiles { count, max, .. }) => {
                assert!(count > max as f64);
                assert_eq!(max, MAX_TILES);
            }
            other => panic!("expected TooManyTiles, got {:?}", other.map(|t| t.len())),
        }
        assert!(square_tiles(&bounds, 0.01).is_err());
        assert_eq!(square_tiles(&bounds, 1000.0).unwrap().len(), 16 * 16);
    }

    #[test]
    fn test_degenerate_extent_has_no_tiles() {
        let bounds = BoundingBox::new(5.0, 5.0, 5.0, 20.0);
        assert!(square_tiles(&bounds, 10.0).unwrap().is_empty());
    }

    #[test]
    fn test_tiles_for_grid_uses_utm() {
        let zone = bbox_zone("las-rosas", bbox::LAS_ROSAS);
        let (nw, se) = zone.corners().unwrap();
        let cell = grid_common::Cell::new(
            "P0",
            "las-rosas",
            vec![
                [nw.lon, nw.lat],
                [se.lon, nw.lat],
                [se.lon, se.lat],
                [nw.lon, se.lat],
                [nw.lon, nw.lat],
            ],
        );
        let grid = Grid::new(0, vec![cell]);

        let (crs, tiles) = tiles_for_grid(&grid, 1035.0, &AggregationConfig::default()).unwrap();
        assert_eq!(crs, Crs::parse("EPSG:32719"));
        // About 14 km x 11 km
        assert!(tiles.len() >= 14 * 11 && tiles.len() <= 16 * 13, "{}", tiles.len());
    }
}
