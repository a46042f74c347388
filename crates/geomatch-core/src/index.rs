//! Spatial index over the source collection

use crate::models::Neighbor;
use crate::store::RecordStore;
use geo::{Distance, Euclidean, Point};
use rstar::{RTree, RTreeObject, AABB};

/// Indexed source point with its record id
#[derive(Debug, Clone, PartialEq)]
struct IndexedPoint {
    /// Positional index of the record in the source store
    id: usize,

    position: Point<f64>,

    /// Degenerate point envelope for R-tree placement
    envelope: AABB<[f64; 2]>,
}

impl IndexedPoint {
    fn new(id: usize, position: Point<f64>) -> Self {
        let envelope = AABB::from_point([position.x(), position.y()]);
        Self { id, position, envelope }
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Read-only proximity index over the source layer.
///
/// Queries prefilter candidates with a bounding-box lookup and qualify them
/// with the exact Euclidean distance; the box never decides a match on its
/// own. Candidates are returned in source-id order, so the same build
/// answers the same query identically every time.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from a loaded source store
    pub fn build(records: &RecordStore) -> Self {
        let indexed: Vec<IndexedPoint> = records
            .iter()
            .enumerate()
            .map(|(id, record)| IndexedPoint::new(id, record.position))
            .collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Every source point strictly closer than `threshold` to `point`.
    ///
    /// Points exactly at the threshold distance do not qualify.
    pub fn query(&self, point: Point<f64>, threshold: f64) -> Vec<Neighbor> {
        let min = [point.x() - threshold, point.y() - threshold];
        let max = [point.x() + threshold, point.y() + threshold];
        let bbox = AABB::from_corners(min, max);

        let mut neighbors: Vec<Neighbor> = self
            .tree
            .locate_in_envelope(&bbox)
            .filter_map(|candidate| {
                let distance = Euclidean.distance(candidate.position, point);
                (distance < threshold).then_some(Neighbor { source: candidate.id, distance })
            })
            .collect();

        neighbors.sort_unstable_by_key(|neighbor| neighbor.source);
        neighbors
    }

    /// Get the total number of indexed points
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
