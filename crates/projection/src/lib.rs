//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies:
//! the WGS84 authalic sphere, UTM, Lambert azimuthal equal-area and the
//! HEALPix / rHEALPix equal-area projections underlying the DGGS.

pub mod ellipsoid;
pub mod error;
pub mod healpix;
pub mod laea;
pub mod transform;
pub mod utm;

pub use ellipsoid::{Ellipsoid, WGS84};
pub use error::{ProjectionError, Result};
pub use healpix::Rhealpix;
pub use laea::LambertAzimuthalEqualArea;
pub use transform::{Projector, Transformer};
pub use utm::TransverseMercator;
