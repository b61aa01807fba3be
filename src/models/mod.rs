//! Core data models for region matching.

pub mod point;
pub mod region;
pub mod result;

pub use point::{CoordinateRecord, Point, RawPoint};
pub use region::{ParentRegion, ParentTable, Region, RegionId};
pub use result::{MatchResult, MatchedRegion};
