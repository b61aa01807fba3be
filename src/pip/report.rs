//! Assembly of match counts into results and summaries.

use serde::Serialize;

use super::hierarchy::resolve_parents;
use super::index::RegionIndex;
use super::matcher::RegionCounts;
use crate::models::{MatchResult, MatchedRegion, ParentTable};

/// Turn a run's count table into a [`MatchResult`].
pub fn build_result(
    index: &RegionIndex,
    counts: &RegionCounts,
    parents: &ParentTable,
    rejected_points: u64,
) -> MatchResult {
    let mut matched_regions = Vec::new();
    let mut matched = Vec::new();
    for (slot, point_count) in counts.matched_slots() {
        let Some(region) = index.region(slot) else {
            continue;
        };
        matched.push(region.as_ref());
        matched_regions.push(MatchedRegion {
            id: region.id.clone(),
            parent_key: region.parent_key.clone(),
            name: region.name.clone(),
            point_count,
        });
    }

    let parent_names = resolve_parents(matched, parents);
    let total_matched_points = matched_regions.iter().map(|r| r.point_count).sum();

    MatchResult {
        matched_regions,
        parent_names,
        total_points: counts.points_processed(),
        total_matched_points,
        rejected_points,
    }
}

/// Read-only summary of a [`MatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub total_points: u64,
    pub rejected_points: u64,
    pub regions_matched: usize,
    pub parents_covered: usize,
    pub total_matched_points: u64,
    pub parent_names: Vec<String>,
}

impl AggregateReport {
    pub fn from_result(result: &MatchResult) -> Self {
        Self {
            total_points: result.total_points,
            rejected_points: result.rejected_points,
            regions_matched: result.matched_regions.len(),
            parents_covered: result.parent_names.len(),
            total_matched_points: result.total_matched_points,
            parent_names: result.parent_names.clone(),
        }
    }

    /// First `limit` parent names joined by commas, with `and N more` when truncated
    pub fn parent_names_display(&self, limit: usize) -> String {
        let shown: Vec<&str> = self
            .parent_names
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect();
        let mut out = shown.join(", ");
        if self.parent_names.len() > limit {
            out.push_str(&format!(" and {} more", self.parent_names.len() - limit));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(names: &[&str]) -> AggregateReport {
        AggregateReport {
            total_points: 0,
            rejected_points: 0,
            regions_matched: 0,
            parents_covered: names.len(),
            total_matched_points: 0,
            parent_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_display_short_list() {
        assert_eq!(report(&["Ohio", "Utah"]).parent_names_display(5), "Ohio, Utah");
        assert_eq!(report(&[]).parent_names_display(5), "");
    }

    #[test]
    fn test_display_truncated_keeps_full_list() {
        let r = report(&["A", "B", "C", "D", "E", "F", "G"]);
        assert_eq!(r.parent_names_display(5), "A, B, C, D, E and 2 more");
        assert_eq!(r.parent_names.len(), 7);
    }

    #[test]
    fn test_from_result() {
        let result = MatchResult {
            matched_regions: vec![MatchedRegion {
                id: "06037".into(),
                parent_key: "06".into(),
                name: None,
                point_count: 4,
            }],
            parent_names: vec!["California".into()],
            total_points: 9,
            total_matched_points: 4,
            rejected_points: 2,
        };
        let r = AggregateReport::from_result(&result);
        assert_eq!(r.total_points, 9);
        assert_eq!(r.rejected_points, 2);
        assert_eq!(r.regions_matched, 1);
        assert_eq!(r.parents_covered, 1);
        assert_eq!(r.total_matched_points, 4);
    }
}
