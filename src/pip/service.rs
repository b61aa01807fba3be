//! PIP service tying normalization, matching and roll-up together.

use tracing::info;

use super::index::RegionIndex;
use super::matcher::{MatchEngine, RegionCounts};
use super::report::build_result;
use crate::coords::normalize_batch;
use crate::models::{MatchResult, ParentTable, Point, RawPoint};

/// Point-in-Polygon matching service over one region set.
///
/// The index and parent table are read-only; every call gets a fresh count
/// table, so one service can match any number of batches.
pub struct PipService {
    index: RegionIndex,
    parents: ParentTable,
    parallel: bool,
}

impl PipService {
    /// Create a new PIP service from a spatial index
    pub fn new(index: RegionIndex, parents: ParentTable) -> Self {
        Self {
            index,
            parents,
            parallel: false,
        }
    }

    /// Spread matching across the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Match already normalized points.
    pub fn match_points(&self, points: &[Point], rejected_points: u64) -> MatchResult {
        let engine = MatchEngine::new(&self.index);
        let counts = if self.parallel {
            engine.run_parallel(points)
        } else {
            engine.run(points)
        };
        self.finish(&counts, rejected_points)
    }

    /// Normalize and match raw points; rejects are dropped and counted.
    pub fn match_raw(&self, raws: &[RawPoint]) -> MatchResult {
        let batch = normalize_batch(raws);
        self.match_points(&batch.points, batch.rejected_total())
    }

    /// Build a result from a count table filled elsewhere (e.g. batch by batch)
    pub fn finish(&self, counts: &RegionCounts, rejected_points: u64) -> MatchResult {
        let result = build_result(&self.index, counts, &self.parents, rejected_points);
        info!(
            "Found {} regions matching {} points across {} parent regions",
            result.matched_regions.len(),
            result.total_matched_points,
            result.parent_names.len()
        );
        result
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn parents(&self) -> &ParentTable {
        &self.parents
    }
}
