//! Spatial index for fast region candidate lookups.

use geo::Coord;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::geometry;
use crate::models::{Region, RegionId};

/// Fatal index construction failures
#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error("no regions supplied")]
    EmptyRegionSet,
    #[error("none of the {0} regions has a usable boundary")]
    NoUsableRegions(usize),
}

/// Wrapper for R-tree indexing of regions.
///
/// `slot` is the region's position in [`RegionIndex::regions`] and keys the
/// per-run count tables.
#[derive(Debug, Clone)]
pub struct IndexedRegion {
    pub slot: usize,
    pub region: Arc<Region>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    fn new(slot: usize, region: Arc<Region>) -> Option<Self> {
        let rect = region.bounding_box()?;
        Some(Self {
            slot,
            region,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// Read-only R-tree over region bounding boxes.
///
/// Built once per region set (bulk load, O(n log n)); candidate queries are
/// O(log n) expected. Regions whose boundary fails validation stay in
/// [`regions`](Self::regions) but are left out of the tree, so they can
/// never match.
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    /// Regions in ascending id order
    regions: Vec<Arc<Region>>,
}

impl RegionIndex {
    /// Build the index from all regions of a run.
    ///
    /// Region ids are unique in the result: later copies of an id are dropped.
    pub fn build(regions: Vec<Region>) -> Result<Self, IndexBuildError> {
        if regions.is_empty() {
            return Err(IndexBuildError::EmptyRegionSet);
        }

        info!("Building spatial index for {} regions...", regions.len());

        let mut regions: Vec<Arc<Region>> = regions.into_iter().map(Arc::new).collect();
        // Stable sort, so the first supplied copy of a duplicate id wins
        regions.sort_by(|a, b| a.id.cmp(&b.id));
        regions.dedup_by(|later, first| {
            let duplicate = later.id == first.id;
            if duplicate {
                warn!("Duplicate region id {}; keeping the first copy", first.id);
            }
            duplicate
        });

        let mut indexed = Vec::with_capacity(regions.len());
        for (slot, region) in regions.iter().enumerate() {
            if let Err(e) = geometry::validate(&region.boundary) {
                warn!("Region {} excluded from matching: {}", region.id, e);
                continue;
            }
            match IndexedRegion::new(slot, Arc::clone(region)) {
                Some(ir) => indexed.push(ir),
                None => warn!("Region {} has no bounding box", region.id),
            }
        }

        if indexed.is_empty() {
            return Err(IndexBuildError::NoUsableRegions(regions.len()));
        }

        let excluded = regions.len() - indexed.len();
        let tree = RTree::bulk_load(indexed);

        info!(
            "Spatial index built with {} entries ({} excluded)",
            tree.size(),
            excluded
        );

        Ok(Self { tree, regions })
    }

    /// All indexed regions whose bounding box contains the coordinate,
    /// edges included. A cheap pre-filter, not a containment guarantee.
    pub fn candidates(&self, coord: Coord<f64>) -> impl Iterator<Item = &IndexedRegion> {
        let query_envelope = AABB::from_point([coord.x, coord.y]);
        self.tree.locate_in_envelope_intersecting(&query_envelope)
    }

    /// Ids of the bounding-box candidates for a coordinate, ascending
    pub fn candidate_ids(&self, coord: Coord<f64>) -> Vec<&RegionId> {
        let mut ids: Vec<&RegionId> = self.candidates(coord).map(|ir| &ir.region.id).collect();
        ids.sort();
        ids
    }

    /// Every region supplied at build time, ascending by id
    pub fn regions(&self) -> &[Arc<Region>] {
        &self.regions
    }

    /// Look up a region by its slot
    pub fn region(&self, slot: usize) -> Option<&Arc<Region>> {
        self.regions.get(slot)
    }

    /// Number of regions in the tree (excludes invalid ones)
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Number of regions supplied, valid or not
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon, LineString, MultiPolygon, Polygon};

    fn square(id: &str, min_x: f64, min_y: f64, size: f64) -> Region {
        Region::from_polygon(
            id,
            "01",
            polygon![
                (x: min_x, y: min_y),
                (x: min_x + size, y: min_y),
                (x: min_x + size, y: min_y + size),
                (x: min_x, y: min_y + size),
                (x: min_x, y: min_y)
            ],
        )
    }

    #[test]
    fn test_empty_region_set_fails() {
        assert!(matches!(
            RegionIndex::build(vec![]),
            Err(IndexBuildError::EmptyRegionSet)
        ));
    }

    #[test]
    fn test_all_invalid_fails() {
        let broken = Region::new("X", "01", MultiPolygon::new(vec![]));
        assert!(matches!(
            RegionIndex::build(vec![broken]),
            Err(IndexBuildError::NoUsableRegions(1))
        ));
    }

    #[test]
    fn test_invalid_region_kept_but_not_indexed() {
        let flat = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (5.0, 0.0), (9.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        let index = RegionIndex::build(vec![
            square("B", 0.0, 0.0, 10.0),
            Region::from_polygon("A", "01", flat),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.region_count(), 2);
        assert_eq!(index.regions()[0].id.as_str(), "A");
        assert_eq!(index.candidate_ids(coord! { x: 1.0, y: 0.0 }), vec![&RegionId::from("B")]);
    }

    #[test]
    fn test_self_intersecting_region_kept_but_not_indexed() {
        let bowtie = Region::from_polygon(
            "BOW",
            "01",
            polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 10.0, y: 0.0),
                (x: 0.0, y: 4.0),
                (x: 0.0, y: 0.0)
            ],
        );
        let index = RegionIndex::build(vec![bowtie, square("SQ", 20.0, 0.0, 5.0)]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.region_count(), 2);
        assert_eq!(index.regions()[0].id.as_str(), "BOW");
        assert!(index.candidate_ids(coord! { x: 5.0, y: 1.0 }).is_empty());
        assert!(index.candidate_ids(coord! { x: 9.0, y: 5.0 }).is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first_copy() {
        let index = RegionIndex::build(vec![
            square("A", 0.0, 0.0, 1.0),
            square("B", 5.0, 0.0, 1.0),
            square("A", 10.0, 0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(index.region_count(), 2);
        assert_eq!(index.len(), 2);
        assert_eq!(index.candidate_ids(coord! { x: 0.5, y: 0.5 }), vec![&RegionId::from("A")]);
        assert!(index.candidate_ids(coord! { x: 10.5, y: 0.5 }).is_empty());
    }

    #[test]
    fn test_candidates_by_bbox() {
        let index = RegionIndex::build(vec![
            square("A", 0.0, 0.0, 10.0),
            square("B", 20.0, 0.0, 10.0),
            square("C", 5.0, 5.0, 10.0),
        ])
        .unwrap();

        let ids = index.candidate_ids(coord! { x: 7.0, y: 7.0 });
        assert_eq!(ids, vec![&RegionId::from("A"), &RegionId::from("C")]);

        let ids = index.candidate_ids(coord! { x: 25.0, y: 5.0 });
        assert_eq!(ids, vec![&RegionId::from("B")]);

        assert!(index.candidate_ids(coord! { x: 100.0, y: 100.0 }).is_empty());
    }

    #[test]
    fn test_bbox_edge_is_candidate() {
        let index = RegionIndex::build(vec![square("A", 0.0, 0.0, 10.0)]).unwrap();
        assert_eq!(index.candidate_ids(coord! { x: 10.0, y: 10.0 }).len(), 1);
    }

    #[test]
    fn test_slots_follow_id_order() {
        let index = RegionIndex::build(vec![
            square("C", 0.0, 0.0, 1.0),
            square("A", 2.0, 0.0, 1.0),
            square("B", 4.0, 0.0, 1.0),
        ])
        .unwrap();
        for (slot, region) in index.regions().iter().enumerate() {
            assert_eq!(index.region(slot).unwrap().id, region.id);
        }
        let found = index.candidates(coord! { x: 2.5, y: 0.5 }).next().unwrap();
        assert_eq!(found.slot, 0);
        assert_eq!(found.region.id.as_str(), "A");
    }
}
