//! Transverse Mercator / UTM projection.
//!
//! Uses the Krüger n-series to third order, which is accurate to well under
//! a millimeter inside a UTM zone.
//!
//! UTM parameters:
//! - Central meridian: zone * 6 - 183 degrees
//! - Scale factor on the central meridian: 0.9996
//! - False easting: 500 000 m
//! - False northing: 0 m (north), 10 000 000 m (south)

use grid_common::Hemisphere;

use crate::Ellipsoid;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Rectifying radius A (meters)
    a_rect: f64,
    /// Conformal latitude factor (2√n / (1 + n))
    conformal: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercator {
    /// Create a Transverse Mercator projection.
    ///
    /// # Arguments
    /// * `ellipsoid` - Reference ellipsoid
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `k0` - Scale factor on the central meridian
    /// * `false_easting` - Meters added to eastings
    /// * `false_northing` - Meters added to northings
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.f / (2.0 - ellipsoid.f);
        let n2 = n * n;
        let n3 = n2 * n;

        let a_rect = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        Self {
            lon0: lon0_deg.to_radians(),
            k0,
            false_easting,
            false_northing,
            a_rect,
            conformal: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    /// WGS84 / UTM zone projection.
    pub fn utm(zone: u8, hemisphere: Hemisphere) -> Self {
        let lon0 = zone as f64 * 6.0 - 183.0;
        let false_northing = match hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => 10_000_000.0,
        };
        Self::new(crate::WGS84, lon0, 0.9996, 500_000.0, false_northing)
    }

    /// Geographic degrees → (easting, northing) in meters.
    ///
    /// Returns `None` more than 90° away from the central meridian, where the
    /// projection is undefined.
    pub fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let phi = lat.to_radians();
        let mut dlon = lon.to_radians() - self.lon0;
        dlon = crate::healpix::wrap_lambda(dlon);
        if dlon.abs() >= std::f64::consts::FRAC_PI_2 {
            return None;
        }

        let s = phi.sin();
        let t = (s.atanh() - self.conformal * (self.conformal * s).atanh()).sinh();
        let xi_p = t.atan2(dlon.cos());
        let eta_p = (dlon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let easting = self.false_easting + self.k0 * self.a_rect * eta;
        let northing = self.false_northing + self.k0 * self.a_rect * xi;
        if easting.is_finite() && northing.is_finite() {
            Some((easting, northing))
        } else {
            None
        }
    }

    /// (easting, northing) in meters → geographic degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> Option<(f64, f64)> {
        let xi = (northing - self.false_northing) / (self.k0 * self.a_rect);
        let eta = (easting - self.false_easting) / (self.k0 * self.a_rect);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).clamp(-1.0, 1.0).asin();
        let mut phi = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            phi += delta * (2.0 * (j + 1) as f64 * chi).sin();
        }
        let lambda = self.lon0 + eta_p.sinh().atan2(xi_p.cos());

        let lon = crate::healpix::wrap_lambda(lambda).to_degrees();
        let lat = phi.to_degrees();
        if lon.is_finite() && lat.is_finite() {
            Some((lon, lat))
        } else {
            None
        }
    }
}
