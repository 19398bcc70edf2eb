//! Meteorological quantities derived from aggregated ERA5-Land fields.
//!
//! Every function takes and returns `Option<f64>`: a missing input yields a
//! missing output, never a value computed from the remaining inputs.
//!
//! Temperatures are in Kelvin, vapour pressures in hPa.

use grid_common::WeightedCell;
use serde::{Deserialize, Serialize};

/// 0 °C in Kelvin.
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// Wind speed from the u (eastward) and v (northward) components.
pub fn wind_speed(u: Option<f64>, v: Option<f64>) -> Option<f64> {
    Some(u?.hypot(v?))
}

/// Direction the wind blows from, in degrees clockwise from north, [0, 360).
pub fn wind_direction(u: Option<f64>, v: Option<f64>) -> Option<f64> {
    let (u, v) = (u?, v?);
    Some(((-u).atan2(-v).to_degrees() + 360.0) % 360.0)
}

pub fn kelvin_to_celsius(t: Option<f64>) -> Option<f64> {
    Some(t? - ZERO_CELSIUS_K)
}

/// Saturation vapour pressure over water (Bolton 1980), hPa.
pub fn saturation_vapor_pressure(t: Option<f64>) -> Option<f64> {
    let t = t?;
    Some(6.112 * (17.67 * (t - ZERO_CELSIUS_K) / (t - 29.65)).exp())
}

/// Relative humidity in percent from temperature and dewpoint.
pub fn relative_humidity(t: Option<f64>, td: Option<f64>) -> Option<f64> {
    let es_t = saturation_vapor_pressure(t)?;
    let es_td = saturation_vapor_pressure(td)?;
    Some(100.0 * es_td / es_t)
}

/// Vapour pressure deficit in hPa from temperature and dewpoint.
pub fn vapor_pressure_deficit(t: Option<f64>, td: Option<f64>) -> Option<f64> {
    Some(saturation_vapor_pressure(t)? - saturation_vapor_pressure(td)?)
}

/// Names of the aggregated attributes the derived quantities read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteoAttributes {
    pub u_wind: String,
    pub v_wind: String,
    pub temperature: String,
    pub dewpoint: String,
}

impl Default for MeteoAttributes {
    /// ERA5-Land band names.
    fn default() -> Self {
        Self {
            u_wind: "u_component_of_wind_10m".to_string(),
            v_wind: "v_component_of_wind_10m".to_string(),
            temperature: "temperature_2m".to_string(),
            dewpoint: "dewpoint_temperature_2m".to_string(),
        }
    }
}

impl MeteoAttributes {
    pub fn names(&self) -> Vec<String> {
        vec![
            self.u_wind.clone(),
            self.v_wind.clone(),
            self.temperature.clone(),
            self.dewpoint.clone(),
        ]
    }
}

/// Derived quantities for one cell and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub temperature_c: Option<f64>,
    pub dewpoint_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub vapor_pressure_deficit: Option<f64>,
}

impl DerivedRecord {
    pub fn from_weighted(cell: &WeightedCell, names: &MeteoAttributes) -> Self {
        let u = cell.mean(&names.u_wind);
        let v = cell.mean(&names.v_wind);
        let t = cell.mean(&names.temperature);
        let td = cell.mean(&names.dewpoint);

        Self {
            wind_speed: wind_speed(u, v),
            wind_direction: wind_direction(u, v),
            temperature_c: kelvin_to_celsius(t),
            dewpoint_c: kelvin_to_celsius(td),
            relative_humidity: relative_humidity(t, td),
            vapor_pressure_deficit: vapor_pressure_deficit(t, td),
        }
    }

    /// Output property names and values. Celsius fields carry a `_C`
    /// suffix; the Kelvin means stay under their `_weighted` names.
    pub fn properties(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("wind_speed_10m", self.wind_speed),
            ("wind_dir_10m", self.wind_direction),
            ("temperature_2m_C", self.temperature_c),
            ("dewpoint_temperature_2m_C", self.dewpoint_c),
            ("relative_humidity", self.relative_humidity),
            ("VPD", self.vapor_pressure_deficit),
        ]
    }
}
