//! Region (county) and parent region (state) records.

use geo::{BoundingRect, MultiPolygon, Polygon, Rect};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a region, e.g. a county GEOID like `"06037"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A polygonal area tested for point containment.
///
/// Immutable once loaded. Match counts are kept per run in
/// [`crate::pip::RegionCounts`], never on the region itself.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    /// Key into the [`ParentTable`] (e.g. state FIPS code)
    pub parent_key: String,
    /// Display name, if the source carried one
    pub name: Option<String>,
    /// Boundary in (lon, lat) degrees; a single polygon is a one-member multipolygon
    pub boundary: MultiPolygon<f64>,
}

impl Region {
    pub fn new(
        id: impl Into<RegionId>,
        parent_key: impl Into<String>,
        boundary: MultiPolygon<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_key: parent_key.into(),
            name: None,
            boundary,
        }
    }

    pub fn from_polygon(
        id: impl Into<RegionId>,
        parent_key: impl Into<String>,
        polygon: Polygon<f64>,
    ) -> Self {
        Self::new(id, parent_key, MultiPolygon::new(vec![polygon]))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Axis-aligned box minimally enclosing the boundary.
    ///
    /// `None` for an empty boundary.
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        self.boundary.bounding_rect()
    }
}

impl From<String> for RegionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A coarser area (e.g. a state) grouping regions by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRegion {
    pub key: String,
    pub name: String,
}

/// Lookup table from parent key to parent region.
#[derive(Debug, Clone, Default)]
pub struct ParentTable {
    by_key: HashMap<String, ParentRegion>,
}

impl ParentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parent, replacing any earlier entry with the same key
    pub fn insert(&mut self, parent: ParentRegion) {
        self.by_key.insert(parent.key.clone(), parent);
    }

    pub fn get(&self, key: &str) -> Option<&ParentRegion> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl FromIterator<ParentRegion> for ParentTable {
    fn from_iter<I: IntoIterator<Item = ParentRegion>>(iter: I) -> Self {
        let mut table = ParentTable::new();
        for parent in iter {
            table.insert(parent);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_bounding_box_from_boundary() {
        let poly = polygon![(x: -1.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 5.0), (x: -1.0, y: 2.0)];
        let region = Region::from_polygon("A", "01", poly);
        let rect = region.bounding_box().unwrap();
        assert_eq!(rect.min().x, -1.0);
        assert_eq!(rect.min().y, 2.0);
        assert_eq!(rect.max().x, 3.0);
        assert_eq!(rect.max().y, 5.0);
    }

    #[test]
    fn test_empty_boundary_has_no_bbox() {
        let region = Region::new("A", "01", MultiPolygon::new(vec![]));
        assert!(region.bounding_box().is_none());
    }

    #[test]
    fn test_parent_table_last_insert_wins() {
        let table: ParentTable = vec![
            ParentRegion {
                key: "06".into(),
                name: "Calif".into(),
            },
            ParentRegion {
                key: "06".into(),
                name: "California".into(),
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("06").unwrap().name, "California");
        assert!(table.get("36").is_none());
    }
}
