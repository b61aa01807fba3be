//! Output of a matching run.

use serde::Serialize;

use super::RegionId;

/// A region with at least one contained point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRegion {
    pub id: RegionId,
    pub parent_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub point_count: u64,
}

/// Result of matching one batch of points against a region set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Regions with `point_count > 0`, ascending by id
    pub matched_regions: Vec<MatchedRegion>,
    /// Distinct parent names of the matched regions, sorted
    pub parent_names: Vec<String>,
    /// Points fed to the matcher (after normalization)
    pub total_points: u64,
    /// Sum of `point_count` over matched regions
    pub total_matched_points: u64,
    /// Raw points dropped by normalization
    pub rejected_points: u64,
}

impl MatchResult {
    pub fn region(&self, id: &str) -> Option<&MatchedRegion> {
        self.matched_regions
            .binary_search_by(|r| r.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.matched_regions[i])
    }

    /// Count for a region id; 0 when unmatched or unknown
    pub fn count(&self, id: &str) -> u64 {
        self.region(id).map(|r| r.point_count).unwrap_or(0)
    }
}
