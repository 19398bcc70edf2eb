//! Lambert azimuthal equal-area projection on the authalic sphere.
//!
//! Area preserving everywhere, with low shape distortion near the center,
//! which makes it a good local frame for area weighting.

use crate::Ellipsoid;

#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    ellipsoid: Ellipsoid,
    /// Center longitude in radians
    lon0: f64,
    /// Authalic latitude of the center in radians
    beta1: f64,
    radius: f64,
}

impl LambertAzimuthalEqualArea {
    /// Create a projection centered on (`lat0`, `lon0`) in degrees.
    pub fn new(ellipsoid: Ellipsoid, lat0: f64, lon0: f64) -> Self {
        Self {
            ellipsoid,
            lon0: lon0.to_radians(),
            beta1: ellipsoid.authalic_latitude(lat0.to_radians()),
            radius: ellipsoid.authalic_radius(),
        }
    }

    /// Geographic degrees → (x, y) in meters.
    ///
    /// Returns `None` at the antipode of the center.
    pub fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let beta = self.ellipsoid.authalic_latitude(lat.to_radians());
        let dlon = lon.to_radians() - self.lon0;

        let denom = 1.0
            + self.beta1.sin() * beta.sin()
            + self.beta1.cos() * beta.cos() * dlon.cos();
        if denom <= 1e-15 {
            return None;
        }
        let k = (2.0 / denom).sqrt();

        let x = self.radius * k * beta.cos() * dlon.sin();
        let y = self.radius
            * k
            * (self.beta1.cos() * beta.sin() - self.beta1.sin() * beta.cos() * dlon.cos());
        Some((x, y))
    }

    /// (x, y) in meters → geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = (x * x + y * y).sqrt();
        if rho < 1e-9 {
            let lat = self.ellipsoid.geodetic_latitude(self.beta1).to_degrees();
            return Some((crate::healpix::wrap_lambda(self.lon0).to_degrees(), lat));
        }
        let ratio = rho / (2.0 * self.radius);
        if ratio > 1.0 {
            return None;
        }

        let c = 2.0 * ratio.asin();
        let beta = (c.cos() * self.beta1.sin() + y * c.sin() * self.beta1.cos() / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lambda = self.lon0
            + (x * c.sin()).atan2(
                rho * self.beta1.cos() * c.cos() - y * self.beta1.sin() * c.sin(),
            );

        let lon = crate::healpix::wrap_lambda(lambda).to_degrees();
        let lat = self.ellipsoid.geodetic_latitude(beta).to_degrees();
        Some((lon, lat))
    }
}
