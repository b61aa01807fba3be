//! Point-to-region matching with per-run count tables.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::geometry;
use super::index::RegionIndex;
use crate::models::{Point, Region, RegionId};

/// Exact containment test run on bounding-box candidates.
pub trait ContainmentTest: Sync {
    fn contains(&self, region: &Region, point: &Point) -> bool;
}

/// Even-odd ray casting, boundary-exclusive
#[derive(Debug, Clone, Copy, Default)]
pub struct RayCasting;

impl ContainmentTest for RayCasting {
    fn contains(&self, region: &Region, point: &Point) -> bool {
        geometry::contains(&region.boundary, point.coord())
    }
}

/// Match counts for one run, keyed by index slot.
///
/// Each run (or each parallel worker) owns its own table; tables are merged
/// by summation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCounts {
    counts: Vec<u64>,
    points: u64,
}

impl RegionCounts {
    /// A zeroed table sized for an index
    pub fn for_index(index: &RegionIndex) -> Self {
        Self::zeroed(index.region_count())
    }

    fn zeroed(slots: usize) -> Self {
        Self {
            counts: vec![0; slots],
            points: 0,
        }
    }

    /// Sum another table into this one
    pub fn merge(&mut self, other: &RegionCounts) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
        self.points += other.points;
    }

    pub fn get(&self, slot: usize) -> u64 {
        self.counts.get(slot).copied().unwrap_or(0)
    }

    /// Points fed through this table, matched or not
    pub fn points_processed(&self) -> u64 {
        self.points
    }

    /// Sum of all region counts; exceeds matched points when regions overlap
    pub fn total_matches(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Slots with a non-zero count, ascending
    pub fn matched_slots(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(slot, c)| (slot, *c))
    }

    /// Count for every region, zero included, keyed by id
    pub fn by_region(&self, index: &RegionIndex) -> BTreeMap<RegionId, u64> {
        index
            .regions()
            .iter()
            .enumerate()
            .map(|(slot, region)| (region.id.clone(), self.get(slot)))
            .collect()
    }
}

/// Counts points per containing region.
///
/// A point adds one to every region that contains it, so overlapping regions
/// each count a shared point.
pub struct MatchEngine<'a, C = RayCasting> {
    index: &'a RegionIndex,
    test: C,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> MatchEngine<'a, RayCasting> {
    pub fn new(index: &'a RegionIndex) -> Self {
        Self::with_test(index, RayCasting)
    }
}

impl<'a, C: ContainmentTest> MatchEngine<'a, C> {
    /// Use a custom containment test
    pub fn with_test(index: &'a RegionIndex, test: C) -> Self {
        Self {
            index,
            test,
            cancel: None,
        }
    }

    /// Stop between points once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn index(&self) -> &RegionIndex {
        self.index
    }

    /// Match all points sequentially into a fresh table.
    pub fn run(&self, points: &[Point]) -> RegionCounts {
        let mut counts = RegionCounts::for_index(self.index);
        self.count_into(&mut counts, points);
        info!(
            "Matched {} points into {} regions ({} matches)",
            counts.points_processed(),
            counts.matched_slots().count(),
            counts.total_matches()
        );
        counts
    }

    /// Match points across the rayon pool.
    ///
    /// Each worker folds into a private table; the tables are summed at the
    /// end, so the result equals [`run`](Self::run) on the same input.
    pub fn run_parallel(&self, points: &[Point]) -> RegionCounts {
        let slots = self.index.region_count();
        let counts = points
            .par_iter()
            .fold(
                || RegionCounts::zeroed(slots),
                |mut local, point| {
                    if !self.is_cancelled() {
                        self.count_point(&mut local, point);
                    }
                    local
                },
            )
            .reduce(
                || RegionCounts::zeroed(slots),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            );
        info!(
            "Matched {} points into {} regions ({} matches, parallel)",
            counts.points_processed(),
            counts.matched_slots().count(),
            counts.total_matches()
        );
        counts
    }

    /// Add a batch of points to an existing table.
    ///
    /// Returns the number of points processed, fewer than `points.len()` only
    /// if cancelled.
    pub fn count_into(&self, counts: &mut RegionCounts, points: &[Point]) -> usize {
        let mut processed = 0;
        for point in points {
            if self.is_cancelled() {
                debug!("Matching cancelled after {} points", processed);
                break;
            }
            self.count_point(counts, point);
            processed += 1;
        }
        processed
    }

    /// Regions containing a single point, ascending by id
    pub fn containing(&self, point: &Point) -> Vec<&RegionId> {
        let mut ids: Vec<&RegionId> = self
            .index
            .candidates(point.coord())
            .filter(|ir| self.test.contains(&ir.region, point))
            .map(|ir| &ir.region.id)
            .collect();
        ids.sort();
        ids
    }

    fn count_point(&self, counts: &mut RegionCounts, point: &Point) {
        counts.points += 1;
        for candidate in self.index.candidates(point.coord()) {
            if self.test.contains(&candidate.region, point) {
                counts.counts[candidate.slot] += 1;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}
