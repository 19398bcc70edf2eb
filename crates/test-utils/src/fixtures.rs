//! Common test fixtures for wildfire-grid tests.
//!
//! Pre-defined regions, timestamps and simple geometries that show up across
//! the suite.

use chrono::{DateTime, TimeZone, Utc};
use geo::{LineString, MultiPolygon, Polygon};
use grid_common::{Cell, Zone};

/// Common bounding boxes as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// Fire buffer near Santiago, Chile (UTM 19S)
    pub const LAS_ROSAS: (f64, f64, f64, f64) = (-70.70, -33.50, -70.55, -33.40);

    /// Fire buffer in north-east Oklahoma (UTM 15N)
    pub const TAHLEQUAH: (f64, f64, f64, f64) = (-94.81, 35.91, -94.75, 35.97);

    /// Small box straddling the equator and prime meridian
    pub const ORIGIN: (f64, f64, f64, f64) = (-0.5, -0.5, 0.5, 0.5);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// A fixed reanalysis timestamp: 2023-02-03 12:00 UTC.
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 2, 3, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The hour after [`fixed_timestamp`].
pub fn next_timestamp() -> DateTime<Utc> {
    fixed_timestamp() + chrono::Duration::hours(1)
}

/// Axis-aligned rectangle, counter-clockwise from the lower-left corner.
pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]),
        vec![],
    )
}

/// Axis-aligned square with its lower-left corner at (`min_x`, `min_y`).
pub fn square(min_x: f64, min_y: f64, size: f64) -> Polygon<f64> {
    rect(min_x, min_y, min_x + size, min_y + size)
}

/// A closed square cell in lon/lat.
pub fn square_cell(code: &str, zone: &str, min_lon: f64, min_lat: f64, size: f64) -> Cell {
    Cell::new(
        code,
        zone,
        vec![
            [min_lon, min_lat + size],
            [min_lon + size, min_lat + size],
            [min_lon + size, min_lat],
            [min_lon, min_lat],
            [min_lon, min_lat + size],
        ],
    )
}

/// A zone covering a bounding box.
pub fn bbox_zone(label: &str, bbox: (f64, f64, f64, f64)) -> Zone {
    let (min_x, min_y, max_x, max_y) = bbox;
    Zone::new(label, MultiPolygon::new(vec![rect(min_x, min_y, max_x, max_y)]))
}
