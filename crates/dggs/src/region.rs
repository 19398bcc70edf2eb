//! Validated generation inputs: subdivision level and region corners.

use grid_common::{BoundingBox, LonLat};

use crate::{DggsError, Result};

/// Deepest subdivision level accepted. Level-15 cells are under a meter
/// across.
pub const MAX_RESOLUTION: u8 = 15;

/// A validated subdivision level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(pub(crate) u8);

impl Resolution {
    /// Validate a raw level. Negative or too deep levels are rejected.
    pub fn new(level: i32) -> Result<Self> {
        if level < 0 || level > MAX_RESOLUTION as i32 {
            return Err(DggsError::UnsupportedLevel {
                level: level as i64,
                max: MAX_RESOLUTION,
            });
        }
        Ok(Self(level as u8))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Resolution {
    type Error = DggsError;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

/// Geographic rectangle cells are generated over, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl RegionBounds {
    /// Build from the north-west and south-east corners.
    ///
    /// The NW corner must lie strictly north and strictly west of the SE
    /// corner. Regions crossing the antimeridian are not supported.
    pub fn from_corners(nw: LonLat, se: LonLat) -> Result<Self> {
        if !nw.is_finite() || !se.is_finite() {
            return Err(DggsError::invalid_region("corners must be finite"));
        }
        for p in [nw, se] {
            if p.lat.abs() > 90.0 || p.lon.abs() > 180.0 {
                return Err(DggsError::invalid_region(format!(
                    "corner ({}, {}) out of range",
                    p.lon, p.lat
                )));
            }
        }
        if nw.lat <= se.lat {
            return Err(DggsError::invalid_region(format!(
                "north-west latitude {} is not north of south-east latitude {}",
                nw.lat, se.lat
            )));
        }
        if nw.lon >= se.lon {
            return Err(DggsError::invalid_region(format!(
                "north-west longitude {} is not west of south-east longitude {}",
                nw.lon, se.lon
            )));
        }

        Ok(Self {
            west: nw.lon,
            south: se.lat,
            east: se.lon,
            north: nw.lat,
        })
    }

    pub fn north_west(&self) -> LonLat {
        LonLat::new(self.west, self.north)
    }

    pub fn south_east(&self) -> LonLat {
        LonLat::new(self.east, self.south)
    }
}

impl From<RegionBounds> for BoundingBox {
    fn from(r: RegionBounds) -> Self {
        BoundingBox::new(r.west, r.south, r.east, r.north)
    }
}

impl TryFrom<&BoundingBox> for RegionBounds {
    type Error = DggsError;

    fn try_from(b: &BoundingBox) -> Result<Self> {
        Self::from_corners(b.north_west(), b.south_east())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_bounds() {
        assert!(Resolution::new(0).is_ok());
        assert_eq!(Resolution::new(10).unwrap().level(), 10);
        assert!(Resolution::new(MAX_RESOLUTION as i32).is_ok());
        assert!(matches!(
            Resolution::new(-1),
            Err(DggsError::UnsupportedLevel { level: -1, .. })
        ));
        assert!(Resolution::new(MAX_RESOLUTION as i32 + 1).is_err());
    }

    #[test]
    fn test_region_from_corners() {
        let r = RegionBounds::from_corners(LonLat::new(-94.81, 35.97), LonLat::new(-94.75, 35.91))
            .unwrap();
        assert_eq!(r.west, -94.81);
        assert_eq!(r.east, -94.75);
        assert_eq!(r.north, 35.97);
        assert_eq!(r.south, 35.91);
    }

    #[test]
    fn test_region_rejects_swapped_corners() {
        let nw = LonLat::new(-94.81, 35.97);
        let se = LonLat::new(-94.75, 35.91);
        assert!(matches!(
            RegionBounds::from_corners(se, nw),
            Err(DggsError::InvalidRegion(_))
        ));
        // North of but east of
        assert!(RegionBounds::from_corners(LonLat::new(-94.7, 35.97), se).is_err());
        // Degenerate
        assert!(RegionBounds::from_corners(nw, nw).is_err());
    }

    #[test]
    fn test_region_rejects_out_of_range() {
        assert!(RegionBounds::from_corners(LonLat::new(-10.0, 91.0), LonLat::new(10.0, 0.0)).is_err());
        assert!(
            RegionBounds::from_corners(LonLat::new(f64::NAN, 10.0), LonLat::new(10.0, 0.0)).is_err()
        );
    }
}
