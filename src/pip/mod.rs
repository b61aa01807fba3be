//! Point-in-Polygon (PIP) region matching.
//!
//! Candidate regions come from an R-tree over bounding boxes; exact
//! containment is a boundary-exclusive ray-casting test. Counts are kept in
//! per-run tables so one index can serve many point batches.

pub mod geometry;
mod hierarchy;
mod index;
mod matcher;
mod report;
mod service;

pub use geometry::{GeometryError, Location};
pub use hierarchy::resolve_parents;
pub use index::{IndexBuildError, IndexedRegion, RegionIndex};
pub use matcher::{ContainmentTest, MatchEngine, RayCasting, RegionCounts};
pub use report::{build_result, AggregateReport};
pub use service::PipService;
