//! Precomputed per-tract geometry used by the matcher.
//!
//! Centroids and bounding boxes are computed in one sequential pass before
//! any target unit is processed, then shared read-only across workers.

use geo::Coord;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use crate::error::{Result, UnitKind};
use crate::models::geometry::{ring_bbox, ring_centroid, validate_polygon};
use crate::models::{BBox, SourceUnit};

/// Derived geometry for one tract.
///
/// Both fields are `None` for a tract with an empty outer ring.
#[derive(Debug, Clone, Copy)]
pub struct TractGeometry {
    pub centroid: Option<Coord<f64>>,
    pub bbox: Option<BBox>,
}

/// Wrapper for R-tree indexing of tract envelopes
#[derive(Debug, Clone)]
struct IndexedTract {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedTract {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable arena of tract geometry, addressed by position in the source slice
pub struct TractIndex {
    entries: Vec<TractGeometry>,
    tree: RTree<IndexedTract>,
}

impl TractIndex {
    /// Validate every tract and precompute its centroid and envelope.
    ///
    /// Fails on the first structurally invalid ring. Tracts with an empty
    /// outer ring get an entry but stay out of the R-tree.
    pub fn build(tracts: &[SourceUnit]) -> Result<Self> {
        let mut entries = Vec::with_capacity(tracts.len());
        let mut indexed = Vec::with_capacity(tracts.len());

        for (position, tract) in tracts.iter().enumerate() {
            validate_polygon(&tract.geometry, UnitKind::Tract, &tract.id)?;

            let bbox = ring_bbox(&tract.geometry);
            entries.push(TractGeometry {
                centroid: ring_centroid(&tract.geometry),
                bbox,
            });

            match bbox {
                Some(bbox) => indexed.push(IndexedTract {
                    position,
                    envelope: AABB::from_corners(
                        [bbox.min_lon, bbox.min_lat],
                        [bbox.max_lon, bbox.max_lat],
                    ),
                }),
                None => debug!("Tract {} has an empty geometry", tract.id),
            }
        }

        let tree = RTree::bulk_load(indexed);
        info!("Tract index built with {} entries", tree.size());

        Ok(Self { entries, tree })
    }

    pub fn get(&self, position: usize) -> Option<&TractGeometry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Positions of tracts whose envelope touches `bbox`, in ascending order
    pub fn candidates(&self, bbox: &BBox) -> Vec<usize> {
        let query = AABB::from_corners(
            [bbox.min_lon, bbox.min_lat],
            [bbox.max_lon, bbox.max_lat],
        );
        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|it| it.position)
            .collect();
        positions.sort_unstable();
        positions
    }
}
