//! rHEALPix DGGS on the WGS84 authalic sphere.
//!
//! Cells are squares in the rHEALPix plane, so a cell's planar geometry
//! follows directly from its address. Geographic boundaries come from
//! sampling the planar square and inverting the projection.
//!
//! Region enumeration descends from the six faces, keeping a cell only when
//! its geographic footprint (lon/lat extent of its sampled boundary)
//! intersects the region. Footprints of intermediate cells are padded since
//! a sampled boundary can slightly underestimate the true extent of curved
//! polar edges.

use grid_common::LonLat;
use projection::Rhealpix;
use tracing::debug;

use crate::{CellAddress, Dggs, DggsCell, DggsError, RegionBounds, Resolution, Result};

/// Samples per edge used for footprints during enumeration.
const FOOTPRINT_SAMPLES: usize = 8;

/// Fraction of a footprint's extent added on each side at internal levels.
const FOOTPRINT_PAD: f64 = 0.1;

/// Default samples per cell edge for output boundaries (corner + midpoint).
pub const DEFAULT_EDGE_SAMPLES: usize = 2;

/// Geographic extent of a cell in degrees.
///
/// Longitudes are unwrapped along the boundary so `east` may exceed 180 or
/// `west` fall below -180.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl Footprint {
    fn padded(&self, fraction: f64) -> Self {
        let dx = (self.east - self.west) * fraction + 1e-9;
        let dy = (self.north - self.south) * fraction + 1e-9;
        Self {
            west: self.west - dx,
            east: self.east + dx,
            south: (self.south - dy).max(-90.0),
            north: (self.north + dy).min(90.0),
        }
    }

    fn intersects(&self, region: &RegionBounds) -> bool {
        if !(self.south < region.north && self.north > region.south) {
            return false;
        }
        if self.east - self.west >= 360.0 {
            return true;
        }
        [-360.0, 0.0, 360.0]
            .iter()
            .any(|shift| self.west + shift < region.east && self.east + shift > region.west)
    }
}

/// rHEALPix grid with both polar squares over the first equatorial column.
#[derive(Debug, Clone)]
pub struct RhealpixDggs {
    projection: Rhealpix,
    edge_samples: usize,
    north_pole: (f64, f64),
    south_pole: (f64, f64),
}

impl RhealpixDggs {
    /// Create the grid sampling `edge_samples` points along each cell edge.
    pub fn new(edge_samples: usize) -> Self {
        Self::with_projection(Rhealpix::default(), edge_samples)
    }

    pub fn with_projection(projection: Rhealpix, edge_samples: usize) -> Self {
        let north_pole = projection.forward(0.0, 90.0);
        let south_pole = projection.forward(0.0, -90.0);
        Self {
            projection,
            edge_samples: edge_samples.max(1),
            north_pole,
            south_pole,
        }
    }

    pub fn projection(&self) -> &Rhealpix {
        &self.projection
    }

    pub fn edge_samples(&self) -> usize {
        self.edge_samples
    }

    /// Planar position of a grid vertex of a cell's face.
    ///
    /// Shared vertices of neighbouring cells go through identical arithmetic,
    /// so they land on bit-identical coordinates.
    fn vertex(&self, origin: (f64, f64), count: u64, col: f64, row: f64) -> (f64, f64) {
        let width = self.projection.face_width();
        let n = count as f64;
        (origin.0 + width * col / n, origin.1 - width * row / n)
    }

    /// Planar boundary samples, clockwise from the upper-left corner.
    fn plane_ring(&self, address: &CellAddress, per_edge: usize) -> Vec<(f64, f64)> {
        let Some(origin) = self.projection.face_origin(address.face_letter()) else {
            return Vec::new();
        };
        let (col, row, count) = address.grid_indices();
        let (c, r) = (col as f64, row as f64);
        let corners = [(c, r), (c + 1.0, r), (c + 1.0, r + 1.0), (c, r + 1.0)];

        let per_edge = per_edge.max(1);
        let mut ring = Vec::with_capacity(4 * per_edge);
        for i in 0..4 {
            let (c0, r0) = corners[i];
            let (c1, r1) = corners[(i + 1) % 4];
            for k in 0..per_edge {
                let t = k as f64 / per_edge as f64;
                ring.push(self.vertex(
                    origin,
                    count,
                    c0 + (c1 - c0) * t,
                    r0 + (r1 - r0) * t,
                ));
            }
        }
        ring
    }

    /// Geographic boundary samples of a cell with `per_edge` points per edge.
    ///
    /// Longitudes are unwrapped along the ring so cells touching the
    /// antimeridian stay contiguous.
    pub fn boundary_samples(&self, address: &CellAddress, per_edge: usize) -> Vec<[f64; 2]> {
        let mut out: Vec<[f64; 2]> = Vec::with_capacity(4 * per_edge);
        for (x, y) in self.plane_ring(address, per_edge) {
            let Some((mut lon, lat)) = self.projection.inverse(x, y) else {
                continue;
            };
            if let Some(prev) = out.last() {
                while lon - prev[0] > 180.0 {
                    lon -= 360.0;
                }
                while lon - prev[0] < -180.0 {
                    lon += 360.0;
                }
            }
            out.push([lon, lat]);
        }
        out
    }

    /// Geographic boundary with the configured samples per edge.
    pub fn boundary(&self, address: &CellAddress) -> Vec<[f64; 2]> {
        self.boundary_samples(address, self.edge_samples)
    }

    /// Geographic centre of a cell.
    pub fn nucleus(&self, address: &CellAddress) -> Option<LonLat> {
        let origin = self.projection.face_origin(address.face_letter())?;
        let (col, row, count) = address.grid_indices();
        let (x, y) = self.vertex(origin, count, col as f64 + 0.5, row as f64 + 0.5);
        let (lon, lat) = self.projection.inverse(x, y)?;
        Some(LonLat::new(lon, lat))
    }

    /// Address of the cell at `resolution` containing a point.
    pub fn cell_at(&self, point: LonLat, resolution: Resolution) -> Result<CellAddress> {
        if !point.is_finite() || point.lat.abs() > 90.0 {
            return Err(DggsError::invalid_region(format!(
                "point ({}, {}) is not a valid position",
                point.lon, point.lat
            )));
        }
        let (x, y) = self.projection.forward(point.lon, point.lat);
        let width = self.projection.face_width();

        // Half-open first so points on a shared edge go to the face on their
        // right/below; the closed pass picks up the outer image edges.
        for closed in [false, true] {
            for face in CellAddress::faces() {
                let Some((ox, oy)) = self.projection.face_origin(face.face_letter()) else {
                    continue;
                };
                let fx = (x - ox) / width;
                let fy = (oy - y) / width;
                let inside = if closed {
                    (0.0..=1.0).contains(&fx) && (0.0..=1.0).contains(&fy)
                } else {
                    (0.0..1.0).contains(&fx) && (0.0..1.0).contains(&fy)
                };
                if inside {
                    return CellAddress::from_unit_offset(face.face_letter(), fx, fy, resolution);
                }
            }
        }

        Err(DggsError::invalid_region(format!(
            "point ({}, {}) fell outside every face",
            point.lon, point.lat
        )))
    }

    fn contains_plane_point(&self, address: &CellAddress, p: (f64, f64)) -> bool {
        let Some(origin) = self.projection.face_origin(address.face_letter()) else {
            return false;
        };
        let (col, row, count) = address.grid_indices();
        let (x0, y0) = self.vertex(origin, count, col as f64, row as f64);
        let (x1, y1) = self.vertex(origin, count, col as f64 + 1.0, row as f64 + 1.0);
        p.0 >= x0 && p.0 <= x1 && p.1 <= y0 && p.1 >= y1
    }

    fn footprint(&self, address: &CellAddress) -> Option<Footprint> {
        let samples = self.boundary_samples(address, FOOTPRINT_SAMPLES);
        let first = samples.first()?;

        let mut fp = Footprint {
            west: first[0],
            east: first[0],
            south: first[1],
            north: first[1],
        };
        for p in &samples[1..] {
            fp.west = fp.west.min(p[0]);
            fp.east = fp.east.max(p[0]);
            fp.south = fp.south.min(p[1]);
            fp.north = fp.north.max(p[1]);
        }

        if self.contains_plane_point(address, self.north_pole) {
            fp.north = 90.0;
            fp.west = -180.0;
            fp.east = 180.0;
        }
        if self.contains_plane_point(address, self.south_pole) {
            fp.south = -90.0;
            fp.west = -180.0;
            fp.east = 180.0;
        }
        Some(fp)
    }

    fn collect(
        &self,
        address: CellAddress,
        region: &RegionBounds,
        target: u8,
        out: &mut Vec<CellAddress>,
    ) {
        let Some(fp) = self.footprint(&address) else {
            return;
        };
        let level = address.level();
        let fp = if level < target {
            fp.padded(FOOTPRINT_PAD)
        } else {
            fp
        };
        if !fp.intersects(region) {
            return;
        }

        if level >= target {
            out.push(address);
            return;
        }
        for child in address.children() {
            self.collect(child, region, target, out);
        }
    }

    /// Addresses at `resolution` whose footprint intersects the region.
    pub fn addresses(&self, region: &RegionBounds, resolution: Resolution) -> Vec<CellAddress> {
        let mut out = Vec::new();
        for face in CellAddress::faces() {
            self.collect(face, region, resolution.level(), &mut out);
        }
        out
    }
}

impl Default for RhealpixDggs {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_SAMPLES)
    }
}

impl Dggs for RhealpixDggs {
    fn cells(&self, region: &RegionBounds, resolution: Resolution) -> Vec<DggsCell> {
        let cells: Vec<DggsCell> = self
            .addresses(region, resolution)
            .into_iter()
            .map(|address| DggsCell {
                boundary: self.boundary(&address),
                code: address.to_string(),
            })
            .collect();

        debug!(
            level = resolution.level(),
            west = region.west,
            south = region.south,
            east = region.east,
            north = region.north,
            cells = cells.len(),
            "Enumerated rHEALPix cells"
        );
        cells
    }

    fn name(&self) -> &str {
        "rHEALPix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(west: f64, south: f64, east: f64, north: f64) -> RegionBounds {
        RegionBounds::from_corners(LonLat::new(west, north), LonLat::new(east, south)).unwrap()
    }

    #[test]
    fn test_origin_cell_address() {
        let dggs = RhealpixDggs::default();
        let address = dggs
            .cell_at(LonLat::new(0.0, 0.0), Resolution::new(2).unwrap())
            .unwrap();
        assert_eq!(address.to_string(), "Q33");
    }

    #[test]
    fn test_level_zero_faces() {
        let dggs = RhealpixDggs::default();
        let r0 = Resolution::new(0).unwrap();
        assert_eq!(dggs.cell_at(LonLat::new(-94.78, 35.94), r0).unwrap().to_string(), "O");
        assert_eq!(dggs.cell_at(LonLat::new(-70.6, -33.45), r0).unwrap().to_string(), "P");
        assert_eq!(dggs.cell_at(LonLat::new(10.0, 80.0), r0).unwrap().to_string(), "N");
        assert_eq!(dggs.cell_at(LonLat::new(10.0, -80.0), r0).unwrap().to_string(), "S");
    }

    #[test]
    fn test_boundary_sample_count() {
        let dggs = RhealpixDggs::new(2);
        let address = CellAddress::parse("Q33").unwrap();
        assert_eq!(dggs.boundary(&address).len(), 8);
        assert_eq!(dggs.boundary_samples(&address, 1).len(), 4);
    }

    #[test]
    fn test_equatorial_cell_is_lonlat_rectangle() {
        // Q33 spans lon [0, 10] and straddles the equator symmetrically
        let dggs = RhealpixDggs::new(1);
        let ring = dggs.boundary(&CellAddress::parse("Q33").unwrap());
        assert_eq!(ring.len(), 4);
        assert!((ring[0][0] - 0.0).abs() < 1e-9);
        assert!((ring[1][0] - 10.0).abs() < 1e-9);
        assert!(ring[0][1] > 0.0);
        assert!((ring[0][1] - ring[1][1]).abs() < 1e-12);
        assert!((ring[2][0] - ring[1][0]).abs() < 1e-12);
        assert!((ring[2][1] + ring[0][1]).abs() < 1e-9);
    }

    #[test]
    fn test_nucleus_inside_cell() {
        let dggs = RhealpixDggs::default();
        let address = CellAddress::parse("O47").unwrap();
        let centre = dggs.nucleus(&address).unwrap();
        assert_eq!(dggs.cell_at(centre, address.resolution()).unwrap(), address);
    }

    #[test]
    fn test_enumeration_contains_point_cells() {
        let dggs = RhealpixDggs::default();
        let r = region(-94.81, 35.91, -94.75, 35.97);
        let level = Resolution::new(7).unwrap();
        let addresses = dggs.addresses(&r, level);
        assert!(!addresses.is_empty());

        for point in [
            LonLat::new(-94.81, 35.97),
            LonLat::new(-94.75, 35.91),
            LonLat::new(-94.78, 35.94),
        ] {
            let address = dggs.cell_at(point, level).unwrap();
            assert!(addresses.contains(&address), "{} missing", address);
        }
    }

    #[test]
    fn test_enumeration_is_sorted_and_unique() {
        let dggs = RhealpixDggs::default();
        let r = region(-70.7, -33.5, -70.5, -33.4);
        let codes: Vec<String> = dggs
            .cells(&r, Resolution::new(6).unwrap())
            .into_iter()
            .map(|c| c.code)
            .collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_region_across_face_seam() {
        // Straddles the O/P boundary at lon -90
        let dggs = RhealpixDggs::default();
        let cells = dggs.addresses(&region(-90.5, 10.0, -89.5, 10.5), Resolution::new(4).unwrap());
        assert!(cells.iter().any(|c| c.face_letter() == 'O'));
        assert!(cells.iter().any(|c| c.face_letter() == 'P'));
    }

    #[test]
    fn test_polar_region() {
        let dggs = RhealpixDggs::default();
        let level = Resolution::new(3).unwrap();
        let cells = dggs.addresses(&region(-180.0, 85.0, 180.0, 90.0), level);
        assert!(cells.iter().all(|c| c.face_letter() == 'N'));
        let pole_cell = dggs.cell_at(LonLat::new(0.0, 90.0), level).unwrap();
        assert!(cells.contains(&pole_cell));
    }

    #[test]
    fn test_footprint_wraps_longitude() {
        let fp = Footprint {
            west: 175.0,
            east: 185.0,
            south: 0.0,
            north: 1.0,
        };
        let r = region(-179.0, 0.2, -178.0, 0.5);
        assert!(fp.intersects(&r));
        let far = region(-170.0, 0.2, -160.0, 0.5);
        assert!(!fp.intersects(&far));
    }
}
