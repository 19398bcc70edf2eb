//! Named regions of interest (fire perimeter buffers).

use geo::{BoundingRect, MultiPolygon};

use crate::{BoundingBox, LonLat};

/// A named region bounding grid generation and feature filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub label: String,
    pub geometry: MultiPolygon<f64>,
}

impl Zone {
    pub fn new(label: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            label: label.into(),
            geometry,
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.geometry.bounding_rect().map(BoundingBox::from)
    }

    /// Northwest and southeast corners of the zone bounds.
    pub fn corners(&self) -> Option<(LonLat, LonLat)> {
        self.bounds().map(|b| (b.north_west(), b.south_east()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_zone_corners() {
        let zone = Zone::new(
            "las-rosas",
            MultiPolygon::new(vec![polygon![
                (x: -70.8, y: -33.6),
                (x: -70.5, y: -33.6),
                (x: -70.5, y: -33.4),
                (x: -70.8, y: -33.4),
            ]]),
        );
        let (nw, se) = zone.corners().unwrap();
        assert_eq!(nw, LonLat::new(-70.8, -33.4));
        assert_eq!(se, LonLat::new(-70.5, -33.6));
    }

    #[test]
    fn test_empty_zone_has_no_bounds() {
        let zone = Zone::new("empty", MultiPolygon::new(vec![]));
        assert!(zone.bounds().is_none());
    }
}
