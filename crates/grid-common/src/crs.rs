//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LonLat;

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

/// Coordinate reference systems understood by the workspace.
///
/// Parsing never fails: names that are not recognised become
/// [`Crs::Unsupported`], which downstream transforms reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// WGS84 geographic, lon/lat in degrees (EPSG:4326)
    Wgs84,
    /// WGS84 / UTM (EPSG:326zz north, EPSG:327zz south), meters
    Utm { zone: u8, hemisphere: Hemisphere },
    /// Lambert azimuthal equal-area on the WGS84 authalic sphere, meters
    LambertAzimuthalEqualArea { lat0: f64, lon0: f64 },
    /// Anything else, kept verbatim for error messages
    Unsupported(String),
}

impl Crs {
    /// Parse a CRS name.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "CRS:84", "OGC:CRS84"
    /// - "urn:ogc:def:crs:EPSG::32614", "urn:ogc:def:crs:OGC:1.3:CRS84"
    /// - "EPSG:32614" / "EPSG:32719" (UTM)
    /// - "LAEA:-33.5,-70.6" (lat0, lon0 in degrees)
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "CRS:84" | "OGC:CRS84" | "URN:OGC:DEF:CRS:OGC:1.3:CRS84" | "WGS84" => {
                return Crs::Wgs84
            }
            _ => {}
        }

        if let Some(params) = normalized.strip_prefix("LAEA:") {
            let parts: Vec<&str> = params.split(',').map(str::trim).collect();
            if let [lat0, lon0] = parts.as_slice() {
                if let (Ok(lat0), Ok(lon0)) = (lat0.parse::<f64>(), lon0.parse::<f64>()) {
                    if lat0.is_finite() && lon0.is_finite() && lat0.abs() <= 90.0 {
                        return Crs::LambertAzimuthalEqualArea { lat0, lon0 };
                    }
                }
            }
            return Crs::Unsupported(s.to_string());
        }

        let code = normalized
            .strip_prefix("URN:OGC:DEF:CRS:EPSG::")
            .or_else(|| normalized.strip_prefix("EPSG:"))
            .and_then(|c| c.parse::<u32>().ok());

        match code {
            Some(code) => Crs::from_epsg(code).unwrap_or_else(|| Crs::Unsupported(s.to_string())),
            None => Crs::Unsupported(s.to_string()),
        }
    }

    /// Map an EPSG code onto a supported CRS.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Crs::Wgs84),
            32601..=32660 => Some(Crs::Utm {
                zone: (code - 32600) as u8,
                hemisphere: Hemisphere::North,
            }),
            32701..=32760 => Some(Crs::Utm {
                zone: (code - 32700) as u8,
                hemisphere: Hemisphere::South,
            }),
            _ => None,
        }
    }

    /// EPSG code, when the CRS has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Wgs84 => Some(4326),
            Crs::Utm {
                zone,
                hemisphere: Hemisphere::North,
            } => Some(32600 + *zone as u32),
            Crs::Utm {
                zone,
                hemisphere: Hemisphere::South,
            } => Some(32700 + *zone as u32),
            _ => None,
        }
    }

    /// UTM zone containing a geographic position.
    ///
    /// Uses the plain 6° zoning without the Norway/Svalbard exceptions.
    pub fn utm_for(point: LonLat) -> Self {
        let lon = wrap_longitude(point.lon);
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        let hemisphere = if point.lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        };
        Crs::Utm { zone, hemisphere }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Crs::Unsupported(_))
    }

    /// Legacy GeoJSON `crs` name for this CRS.
    pub fn urn(&self) -> String {
        match self.epsg() {
            Some(4326) => "urn:ogc:def:crs:OGC:1.3:CRS84".to_string(),
            Some(code) => format!("urn:ogc:def:crs:EPSG::{}", code),
            None => self.to_string(),
        }
    }
}

/// Normalize a longitude in degrees to [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::LambertAzimuthalEqualArea { lat0, lon0 } => write!(f, "LAEA:{},{}", lat0, lon0),
            Crs::Unsupported(name) => write!(f, "{}", name),
            _ => match self.epsg() {
                Some(code) => write!(f, "EPSG:{}", code),
                None => write!(f, "unknown"),
            },
        }
    }
}

impl FromStr for Crs {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Crs::parse(s))
    }
}

impl TryFrom<String> for Crs {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(Crs::parse(&s))
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}
