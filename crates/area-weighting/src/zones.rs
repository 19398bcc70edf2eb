//! Assigning source features to the zones they fall in.

use geo::{BoundingRect, Intersects};
use grid_common::{BoundingBox, SourceFeature, Zone};

/// Pair each zone with every feature whose polygon intersects it.
///
/// Pairs come out zone by zone, in zone order, with features in input order
/// within a zone. A feature overlapping several zones appears once per zone.
pub fn tag_by_zone<'a>(
    features: &'a [SourceFeature],
    zones: &'a [Zone],
) -> Vec<(&'a str, &'a SourceFeature)> {
    zone_memberships(features, zones)
        .into_iter()
        .map(|(z, f)| (zones[z].label.as_str(), &features[f]))
        .collect()
}

/// Same pairing as [`tag_by_zone`], as `(zone index, feature index)`.
pub fn zone_memberships(features: &[SourceFeature], zones: &[Zone]) -> Vec<(usize, usize)> {
    let feature_bounds: Vec<Option<BoundingBox>> = features
        .iter()
        .map(|f| f.polygon.bounding_rect().map(BoundingBox::from))
        .collect();

    let mut tagged = Vec::new();
    for (z, zone) in zones.iter().enumerate() {
        let Some(zone_bounds) = zone.bounds() else {
            continue;
        };
        for (f, (feature, bounds)) in features.iter().zip(&feature_bounds).enumerate() {
            let Some(bounds) = bounds else {
                continue;
            };
            // Boxes that only touch can still intersect, so test inclusively
            if bounds.min_x > zone_bounds.max_x
                || bounds.max_x < zone_bounds.min_x
                || bounds.min_y > zone_bounds.max_y
                || bounds.max_y < zone_bounds.min_y
            {
                continue;
            }
            if zone.geometry.intersects(&feature.polygon) {
                tagged.push((z, f));
            }
        }
    }
    tagged
}
