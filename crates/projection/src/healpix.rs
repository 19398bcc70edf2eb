//! HEALPix and rHEALPix equal-area projections.
//!
//! HEALPix maps the sphere onto an equatorial band of width 2π plus four
//! polar triangles above and below it. rHEALPix rearranges each set of polar
//! triangles into a single square, giving six square faces of side π/2
//! (unit sphere):
//!
//! ```text
//!   N
//!   O  P  Q  R      (north_square = south_square = 0)
//!   S
//! ```
//!
//! The polar square sits above (below) equatorial column `north_square`
//! (`south_square`). The triangle over column `north_square` keeps its
//! orientation; the others are rotated counter-clockwise (north) or
//! clockwise (south) a quarter turn per column.
//!
//! References: Calabretsi & Roukema (2007); Gibb, Raichev & Speth (2016).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::Ellipsoid;

/// asin(2/3): latitude separating equatorial and polar regions.
const PHI_0: f64 = 0.729_727_656_226_966_3;

/// Normalize a longitude in radians to [-π, π).
pub fn wrap_lambda(lambda: f64) -> f64 {
    let wrapped = (lambda + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped >= PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// Column (0..=3) of the quarter-plane containing `x` in [-π, π).
fn column(x: f64) -> usize {
    (((x + PI) / FRAC_PI_2).floor() as i64).clamp(0, 3) as usize
}

/// Central x of a column's polar triangle.
fn column_center(c: usize) -> f64 {
    -3.0 * FRAC_PI_4 + FRAC_PI_2 * c as f64
}

/// Rotate (u, v) counter-clockwise by `quarters` quarter turns.
fn rotate_ccw(u: f64, v: f64, quarters: usize) -> (f64, f64) {
    match quarters % 4 {
        0 => (u, v),
        1 => (-v, u),
        2 => (-u, -v),
        _ => (v, -u),
    }
}

/// HEALPix forward projection on the unit sphere (radians in, radians out).
pub fn healpix_forward(lambda: f64, phi: f64) -> (f64, f64) {
    let lambda = wrap_lambda(lambda);

    if phi.abs() <= PHI_0 {
        return (lambda, 3.0 * PI / 8.0 * phi.sin());
    }

    let sigma = (3.0 * (1.0 - phi.sin().abs())).sqrt();
    let xc = column_center(column(lambda));
    let x = xc + (lambda - xc) * sigma;
    let y = phi.signum() * FRAC_PI_4 * (2.0 - sigma);
    (x, y)
}

/// HEALPix inverse projection on the unit sphere.
///
/// Returns `None` for points outside the projection image.
pub fn healpix_inverse(x: f64, y: f64) -> Option<(f64, f64)> {
    const EPS: f64 = 1e-12;

    if !(-PI - EPS..PI + EPS).contains(&x) || y.abs() > FRAC_PI_2 + EPS {
        return None;
    }

    if y.abs() <= FRAC_PI_4 {
        let phi = (8.0 * y / (3.0 * PI)).clamp(-1.0, 1.0).asin();
        return Some((wrap_lambda(x), phi));
    }

    let xc = column_center(column(x.min(PI - EPS)));
    let tau = 2.0 - 4.0 * y.abs() / PI;
    if tau <= EPS {
        return Some((wrap_lambda(xc), y.signum() * FRAC_PI_2));
    }
    if (x - xc).abs() > FRAC_PI_4 * tau + EPS {
        return None;
    }

    let lambda = xc + (x - xc) / tau;
    let phi = y.signum() * (1.0 - tau * tau / 3.0).clamp(-1.0, 1.0).asin();
    Some((wrap_lambda(lambda), phi))
}

/// The six rHEALPix faces in addressing order.
pub const FACES: [char; 6] = ['N', 'O', 'P', 'Q', 'R', 'S'];

/// rHEALPix projection of an ellipsoid via its authalic sphere.
///
/// Planar coordinates are in meters (unit-sphere coordinates scaled by the
/// authalic radius).
#[derive(Debug, Clone)]
pub struct Rhealpix {
    pub ellipsoid: Ellipsoid,
    /// Equatorial column (0..=3) under the north polar square.
    pub north_square: usize,
    /// Equatorial column (0..=3) over the south polar square.
    pub south_square: usize,
    radius: f64,
}

impl Rhealpix {
    pub fn new(ellipsoid: Ellipsoid, north_square: usize, south_square: usize) -> Self {
        Self {
            ellipsoid,
            north_square: north_square % 4,
            south_square: south_square % 4,
            radius: ellipsoid.authalic_radius(),
        }
    }

    /// Authalic radius used to scale the plane (meters).
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Side length of a resolution-0 face (meters).
    pub fn face_width(&self) -> f64 {
        FRAC_PI_2 * self.radius
    }

    /// Upper-left corner of a face in the plane (meters).
    pub fn face_origin(&self, face: char) -> Option<(f64, f64)> {
        let (x, y) = match face {
            'N' => (-PI + self.north_square as f64 * FRAC_PI_2, 3.0 * FRAC_PI_4),
            'O' => (-PI, FRAC_PI_4),
            'P' => (-FRAC_PI_2, FRAC_PI_4),
            'Q' => (0.0, FRAC_PI_4),
            'R' => (FRAC_PI_2, FRAC_PI_4),
            'S' => (-PI + self.south_square as f64 * FRAC_PI_2, -FRAC_PI_4),
            _ => return None,
        };
        Some((x * self.radius, y * self.radius))
    }

    /// Geographic degrees → rHEALPix plane (meters).
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let beta = self.ellipsoid.authalic_latitude(lat.to_radians());
        let (x, y) = healpix_forward(lon.to_radians(), beta);
        let (x, y) = self.combine_triangles(x, y);
        (x * self.radius, y * self.radius)
    }

    /// rHEALPix plane (meters) → geographic degrees.
    ///
    /// Returns `None` for points outside the six faces.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (x, y) = self.split_squares(x / self.radius, y / self.radius)?;
        let (lambda, beta) = healpix_inverse(x, y)?;
        let phi = self.ellipsoid.geodetic_latitude(beta);
        Some((lambda.to_degrees(), phi.to_degrees()))
    }

    /// HEALPix plane → rHEALPix plane (unit sphere).
    fn combine_triangles(&self, x: f64, y: f64) -> (f64, f64) {
        if y.abs() <= FRAC_PI_4 {
            return (x, y);
        }

        let c = column(x);
        let xc = column_center(c);
        if y > 0.0 {
            let quarters = (c + 4 - self.north_square) % 4;
            let (u, v) = rotate_ccw(x - xc, y - FRAC_PI_2, quarters);
            (column_center(self.north_square) + u, FRAC_PI_2 + v)
        } else {
            let quarters = (c + 4 - self.south_square) % 4;
            let (u, v) = rotate_ccw(x - xc, y + FRAC_PI_2, (4 - quarters) % 4);
            (column_center(self.south_square) + u, -FRAC_PI_2 + v)
        }
    }

    /// rHEALPix plane → HEALPix plane (unit sphere).
    fn split_squares(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        const EPS: f64 = 1e-12;

        if y.abs() <= FRAC_PI_4 + EPS {
            if !(-PI - EPS..PI + EPS).contains(&x) {
                return None;
            }
            return Some((x, y.clamp(-FRAC_PI_4, FRAC_PI_4)));
        }

        let north = y > 0.0;
        let square = if north {
            self.north_square
        } else {
            self.south_square
        };
        let center_x = column_center(square);
        let center_y = if north { FRAC_PI_2 } else { -FRAC_PI_2 };
        let u = x - center_x;
        let v = y - center_y;
        if u.abs() > FRAC_PI_4 + EPS || v.abs() > FRAC_PI_4 + EPS {
            return None;
        }

        // Quadrant of the square, counted from the unrotated triangle in the
        // direction the triangles were rotated.
        let quadrant = if north {
            if v <= -u.abs() {
                0
            } else if u >= v.abs() {
                1
            } else if v >= u.abs() {
                2
            } else {
                3
            }
        } else if v >= u.abs() {
            0
        } else if u >= v.abs() {
            1
        } else if v <= -u.abs() {
            2
        } else {
            3
        };

        let (u0, v0) = if north {
            rotate_ccw(u, v, (4 - quadrant) % 4)
        } else {
            rotate_ccw(u, v, quadrant)
        };
        let c = (square + quadrant) % 4;
        Some((column_center(c) + u0, center_y + v0))
    }
}

impl Default for Rhealpix {
    fn default() -> Self {
        Self::new(crate::WGS84, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phi0() {
        assert!((PHI_0 - (2.0f64 / 3.0).asin()).abs() < 1e-15);
    }

    #[test]
    fn test_healpix_roundtrip() {
        for &(lon, lat) in &[
            (0.0, 0.0),
            (-94.78, 35.94),
            (-70.6, -33.45),
            (120.0, 60.0),
            (-10.0, -75.0),
            (179.0, 85.0),
        ] {
            let (x, y) = healpix_forward(f64::to_radians(lon), f64::to_radians(lat));
            let (l, p) = healpix_inverse(x, y).unwrap();
            assert!((l.to_degrees() - lon).abs() < 1e-9, "lon {} {}", lon, lat);
            assert!((p.to_degrees() - lat).abs() < 1e-9, "lat {} {}", lon, lat);
        }
    }

    #[test]
    fn test_rhealpix_roundtrip_all_regions() {
        let rhealpix = Rhealpix::default();
        for &(lon, lat) in &[
            (-94.78, 35.94),
            (-70.6, -33.45),
            (-150.0, 70.0),
            (-60.0, 70.0),
            (30.0, 70.0),
            (120.0, 70.0),
            (-150.0, -70.0),
            (-60.0, -70.0),
            (30.0, -70.0),
            (120.0, -70.0),
            (45.0, 89.0),
        ] {
            let (x, y) = rhealpix.forward(lon, lat);
            let (l, p) = rhealpix.inverse(x, y).unwrap();
            assert!((l - lon).abs() < 1e-8, "lon {} {} -> {}", lon, lat, l);
            assert!((p - lat).abs() < 1e-8, "lat {} {} -> {}", lon, lat, p);
        }
    }

    #[test]
    fn test_polar_points_land_in_polar_squares() {
        let rhealpix = Rhealpix::default();
        let r = rhealpix.radius();
        let (nx, ny) = rhealpix.face_origin('N').unwrap();
        let (sx, sy) = rhealpix.face_origin('S').unwrap();
        let side = rhealpix.face_width();

        for lon in [-170.0, -100.0, -10.0, 60.0, 150.0] {
            let (x, y) = rhealpix.forward(lon, 80.0);
            assert!(x >= nx && x <= nx + side && y <= ny && y >= ny - side, "north {}", lon);
            let (x, y) = rhealpix.forward(lon, -80.0);
            assert!(x >= sx && x <= sx + side && y <= sy && y >= sy - side, "south {}", lon);
        }

        // The poles map onto the centers of the polar squares
        let (x, y) = rhealpix.forward(0.0, 90.0);
        assert!((x - (nx + side / 2.0)).abs() < 1e-6 * r);
        assert!((y - (ny - side / 2.0)).abs() < 1e-6 * r);
    }

    #[test]
    fn test_outside_image_is_none() {
        let rhealpix = Rhealpix::default();
        let r = rhealpix.radius();
        // Above face P, where only N exists
        assert!(rhealpix.inverse(-0.25 * PI * r, 0.5 * PI * r).is_none());
        assert!(rhealpix.inverse(4.0 * r, 0.0).is_none());
    }
}
