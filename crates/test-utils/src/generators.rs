//! Synthetic source batches shaped like gridded reanalysis data.
//!
//! Values follow simple, predictable patterns so tests can check aggregated
//! results by hand.

use chrono::{DateTime, Utc};
use grid_common::{Crs, SourceBatch, SourceFeature};

use crate::fixtures::square;

/// ERA5-Land attribute names used by the generators.
pub const U_WIND: &str = "u_component_of_wind_10m";
pub const V_WIND: &str = "v_component_of_wind_10m";
pub const TEMPERATURE: &str = "temperature_2m";
pub const DEWPOINT: &str = "dewpoint_temperature_2m";

/// Creates an `nx` x `ny` lattice of adjacent square source features.
///
/// Squares have side `size` and start at (`min_x`, `min_y`), row 0 at the
/// bottom. `values(col, row)` supplies each square's attributes.
///
/// # Example
///
/// ```
/// use grid_common::Crs;
/// use test_utils::{fixed_timestamp, source_lattice};
///
/// let batch = source_lattice(0.0, 0.0, 10.0, 3, 2, Crs::Wgs84, fixed_timestamp(), |c, r| {
///     vec![("id", (r * 3 + c) as f64)]
/// });
/// assert_eq!(batch.len(), 6);
/// assert_eq!(batch.features[4].value("id"), Some(4.0));
/// ```
pub fn source_lattice<F>(
    min_x: f64,
    min_y: f64,
    size: f64,
    nx: usize,
    ny: usize,
    crs: Crs,
    timestamp: DateTime<Utc>,
    values: F,
) -> SourceBatch
where
    F: Fn(usize, usize) -> Vec<(&'static str, f64)>,
{
    let mut features = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            let polygon = square(
                min_x + col as f64 * size,
                min_y + row as f64 * size,
                size,
            );
            let feature = values(col, row)
                .into_iter()
                .fold(SourceFeature::new(polygon, timestamp), |f, (name, value)| {
                    f.with_attribute(name, value)
                });
            features.push(feature);
        }
    }
    SourceBatch::new(crs, timestamp, features)
}

/// Temperature in Kelvin with a gradient from 280K (lower-left) to 300K.
pub fn temperature_at(col: usize, row: usize, nx: usize, ny: usize) -> f64 {
    let x_factor = col as f64 / nx.max(1) as f64;
    let y_factor = row as f64 / ny.max(1) as f64;
    280.0 + x_factor * 10.0 + y_factor * 10.0
}

/// A lattice carrying all four ERA5-Land attributes.
///
/// - u wind = column index, v wind = row index (m/s)
/// - temperature from [`temperature_at`], dewpoint 5K below it
pub fn era5_batch(
    min_x: f64,
    min_y: f64,
    size: f64,
    nx: usize,
    ny: usize,
    crs: Crs,
    timestamp: DateTime<Utc>,
) -> SourceBatch {
    source_lattice(min_x, min_y, size, nx, ny, crs, timestamp, |col, row| {
        let t = temperature_at(col, row, nx, ny);
        vec![
            (U_WIND, col as f64),
            (V_WIND, row as f64),
            (TEMPERATURE, t),
            (DEWPOINT, t - 5.0),
        ]
    })
}
