//! Pairwise cell/source intersections through an R-tree.

use geo::{Area, BooleanOps, BoundingRect, Polygon};
use rstar::{Envelope, RTree, RTreeObject, SelectionFunction, AABB};

/// A source polygon's bounding box in the tree.
#[derive(Debug, Clone)]
struct SourceEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for SourceEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Selects entries whose envelope touches a query box.
struct IntersectingEnvelope(AABB<[f64; 2]>);

impl SelectionFunction<SourceEnvelope> for IntersectingEnvelope {
    fn should_unpack_parent(&self, envelope: &AABB<[f64; 2]>) -> bool {
        envelope.intersects(&self.0)
    }

    fn should_unpack_leaf(&self, leaf: &SourceEnvelope) -> bool {
        leaf.envelope.intersects(&self.0)
    }
}

fn aabb(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon
        .bounding_rect()
        .map(|r| AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]))
}

/// One intersection record: a source polygon overlapping a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Index of the source polygon.
    pub source: usize,
    /// Area of the intersection.
    pub area: f64,
}

/// Spatial index over the projected source polygons of one batch.
pub struct SourceIndex {
    polygons: Vec<Polygon<f64>>,
    tree: RTree<SourceEnvelope>,
}

impl SourceIndex {
    pub fn new(polygons: Vec<Polygon<f64>>) -> Self {
        let entries = polygons
            .iter()
            .enumerate()
            .filter_map(|(index, p)| aabb(p).map(|envelope| SourceEnvelope { index, envelope }))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            polygons,
        }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Sources whose bounding box touches the cell's, ascending by index.
    pub fn candidates(&self, cell: &Polygon<f64>) -> Vec<usize> {
        let Some(query) = aabb(cell) else {
            return Vec::new();
        };
        let mut indices: Vec<usize> = self
            .tree
            .locate_with_selection_function(IntersectingEnvelope(query))
            .map(|e| e.index)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Exact intersections with the cell larger than `min_area`, ascending
    /// by source index.
    pub fn overlaps(&self, cell: &Polygon<f64>, min_area: f64) -> Vec<Overlap> {
        self.candidates(cell)
            .into_iter()
            .filter_map(|source| {
                let area = cell.intersection(&self.polygons[source]).unsigned_area();
                (area > min_area).then_some(Overlap { source, area })
            })
            .collect()
    }
}
