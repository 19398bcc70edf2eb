//! DGGS cells and grids in geographic coordinates.

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::BoundingBox;

/// Decimal digits kept on every cell vertex.
///
/// Adjacent cells compute shared vertices through different arithmetic paths;
/// rounding snaps them onto the same value so seams close exactly.
pub const ROUND_DIGITS: usize = 14;

/// Round a coordinate to a fixed number of decimal digits.
///
/// Goes through the decimal representation so the result matches what a
/// text-based table would store, including for magnitudes where scaling by
/// `10^digits` would overflow the f64 mantissa.
pub fn round_coord(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

/// A polygon cell of the hierarchical grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Hierarchical address, e.g. "P0471".
    pub code: String,
    /// Label of the zone the cell was generated for.
    pub zone: String,
    /// Closed ring of [lon, lat] pairs (first == last).
    pub boundary: Vec<[f64; 2]>,
}

impl Cell {
    pub fn new(code: impl Into<String>, zone: impl Into<String>, boundary: Vec<[f64; 2]>) -> Self {
        Self {
            code: code.into(),
            zone: zone.into(),
            boundary,
        }
    }

    /// Build a cell from raw boundary samples.
    ///
    /// Rounds every coordinate to `digits`, drops consecutive duplicates and
    /// force-closes the ring. Returns `None` when fewer than three distinct
    /// vertices survive.
    pub fn from_samples(
        code: impl Into<String>,
        zone: impl Into<String>,
        samples: &[[f64; 2]],
        digits: usize,
    ) -> Option<Self> {
        let mut ring: Vec<[f64; 2]> = Vec::with_capacity(samples.len() + 1);
        for p in samples {
            let rounded = [round_coord(p[0], digits), round_coord(p[1], digits)];
            if ring.last() != Some(&rounded) {
                ring.push(rounded);
            }
        }

        let closed = ring.len() > 1 && ring.first() == ring.last();
        let distinct = if closed { ring.len() - 1 } else { ring.len() };
        if distinct < 3 {
            return None;
        }
        if !closed {
            ring.push(ring[0]);
        }

        Some(Self::new(code, zone, ring))
    }

    /// First point equals last point.
    pub fn is_closed(&self) -> bool {
        self.boundary.len() >= 4 && self.boundary.first() == self.boundary.last()
    }

    pub fn polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .boundary
            .iter()
            .map(|p| Coord { x: p[0], y: p[1] })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.boundary.iter().copied())
    }
}

/// A set of cells at one subdivision level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub level: u8,
    pub cells: Vec<Cell>,
}

impl Grid {
    pub fn new(level: u8, cells: Vec<Cell>) -> Self {
        Self { level, cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn find(&self, code: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.code == code)
    }

    /// Geographic extent of all cells.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.cells
            .iter()
            .filter_map(Cell::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// First code that appears more than once, if any.
    pub fn duplicate_code(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.cells.len());
        self.cells
            .iter()
            .map(|c| c.code.as_str())
            .find(|code| !seen.insert(*code))
    }

    /// Zone labels in order of first appearance.
    pub fn zones(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.cells
            .iter()
            .map(|c| c.zone.as_str())
            .filter(|z| seen.insert(*z))
            .collect()
    }

    /// Sub-grid holding only the cells of one zone.
    pub fn for_zone(&self, zone: &str) -> Grid {
        Grid::new(
            self.level,
            self.cells.iter().filter(|c| c.zone == zone).cloned().collect(),
        )
    }

    pub fn extend(&mut self, other: Grid) {
        self.cells.extend(other.cells);
    }
}
