//! CRS-to-CRS coordinate transformation.
//!
//! Every transform pivots through WGS84 geographic coordinates; identical
//! source and target CRSs short-circuit to the identity so coordinates come
//! back bit-for-bit unchanged.

use grid_common::Crs;

use crate::{LambertAzimuthalEqualArea, ProjectionError, Result, TransverseMercator, WGS84};

/// A CRS with its projection math.
#[derive(Debug, Clone)]
pub enum Projector {
    Geographic,
    TransverseMercator(TransverseMercator),
    LambertAzimuthalEqualArea(LambertAzimuthalEqualArea),
}

impl Projector {
    pub fn for_crs(crs: &Crs) -> Result<Self> {
        match crs {
            Crs::Wgs84 => Ok(Projector::Geographic),
            Crs::Utm { zone, hemisphere } if (1..=60).contains(zone) => Ok(
                Projector::TransverseMercator(TransverseMercator::utm(*zone, *hemisphere)),
            ),
            Crs::LambertAzimuthalEqualArea { lat0, lon0 } => Ok(
                Projector::LambertAzimuthalEqualArea(LambertAzimuthalEqualArea::new(
                    WGS84, *lat0, *lon0,
                )),
            ),
            other => Err(ProjectionError::UnsupportedCrs(other.to_string())),
        }
    }

    /// Projected (x, y) → geographic (lon, lat) degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self {
            Projector::Geographic => Some((x, y)),
            Projector::TransverseMercator(tm) => tm.inverse(x, y),
            Projector::LambertAzimuthalEqualArea(laea) => laea.inverse(x, y),
        }
    }

    /// Geographic (lon, lat) degrees → projected (x, y).
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self {
            Projector::Geographic => Some((lon, lat)),
            Projector::TransverseMercator(tm) => tm.forward(lon, lat),
            Projector::LambertAzimuthalEqualArea(laea) => laea.forward(lon, lat),
        }
    }
}

/// Transforms coordinates between two CRSs.
#[derive(Debug, Clone)]
pub struct Transformer {
    from_crs: Crs,
    to_crs: Crs,
    from: Projector,
    to: Projector,
    identity: bool,
}

impl Transformer {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        Ok(Self {
            from_crs: from.clone(),
            to_crs: to.clone(),
            from: Projector::for_crs(from)?,
            to: Projector::for_crs(to)?,
            identity: from == to,
        })
    }

    pub fn source(&self) -> &Crs {
        &self.from_crs
    }

    pub fn target(&self) -> &Crs {
        &self.to_crs
    }

    /// Transform a single coordinate.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let out = if self.identity {
            Some((x, y))
        } else {
            self.from
                .to_geographic(x, y)
                .filter(|(lon, lat)| lon.is_finite() && lat.abs() <= 90.0)
                .and_then(|(lon, lat)| self.to.from_geographic(lon, lat))
        };

        match out {
            Some((tx, ty)) if tx.is_finite() && ty.is_finite() => Ok((tx, ty)),
            _ => Err(ProjectionError::OutOfDomain {
                x,
                y,
                from: self.from_crs.to_string(),
                to: self.to_crs.to_string(),
            }),
        }
    }
}
