//! Reference ellipsoid and authalic (equal-area) latitude.
//!
//! Equal-area projections in this crate run on the authalic sphere: a sphere
//! with the same surface area as the ellipsoid, reached by replacing the
//! geodetic latitude φ with the authalic latitude β. Areas are preserved
//! exactly by this substitution.

use std::f64::consts::FRAC_PI_2;

/// An oblate ellipsoid of revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

/// WGS84 ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

impl Ellipsoid {
    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Snyder's q(φ) (eq. 3-12).
    fn q(&self, phi: f64) -> f64 {
        let e = self.e();
        let e2 = self.e2();
        let s = phi.sin();
        (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
    }

    fn qp(&self) -> f64 {
        self.q(FRAC_PI_2)
    }

    /// Radius of the sphere with the same surface area (meters).
    pub fn authalic_radius(&self) -> f64 {
        self.a * (self.qp() / 2.0).sqrt()
    }

    /// Geodetic latitude → authalic latitude (radians).
    pub fn authalic_latitude(&self, phi: f64) -> f64 {
        (self.q(phi) / self.qp()).clamp(-1.0, 1.0).asin()
    }

    /// Authalic latitude → geodetic latitude (radians).
    ///
    /// Series inversion (Snyder eq. 3-18) polished with one Newton step on
    /// eq. 3-16.
    pub fn geodetic_latitude(&self, beta: f64) -> f64 {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let mut phi = beta
            + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin();

        let cos_phi = phi.cos();
        if cos_phi.abs() > 1e-12 {
            let e = self.e();
            let q_target = self.qp() * beta.sin();
            let s = phi.sin();
            let one_minus = 1.0 - e2 * s * s;
            phi += one_minus * one_minus / (2.0 * cos_phi)
                * (q_target / (1.0 - e2) - s / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln());
        }

        phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_authalic_radius() {
        // Known value for WGS84: 6371007.1809 m
        assert_approx_eq!(WGS84.authalic_radius(), 6_371_007.1809, 1e-3);
    }

    #[test]
    fn test_authalic_latitude_fixed_points() {
        assert_eq!(WGS84.authalic_latitude(0.0), 0.0);
        assert!((WGS84.authalic_latitude(FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        // Authalic latitude is slightly smaller in magnitude at mid latitudes
        let phi = 45f64.to_radians();
        let beta = WGS84.authalic_latitude(phi);
        assert!(beta < phi);
        assert!((phi - beta).to_degrees() < 0.14);
    }

    #[test]
    fn test_authalic_roundtrip() {
        for deg in [-89.9, -60.0, -33.45, 0.0, 12.5, 35.94, 70.0, 89.9] {
            let phi = f64::to_radians(deg);
            let back = WGS84.geodetic_latitude(WGS84.authalic_latitude(phi));
            assert!((back - phi).abs() < 1e-12, "lat {}", deg);
        }
    }
}
