//! Footprint - point-to-region matching for location histories
//!
//! This library counts how many observed points fall in each region (e.g. a
//! county) and rolls matched regions up into parent regions (e.g. states).
//! The `footprint` binary wraps it with GeoJSON/JSON loading and export.

pub mod config;
pub mod coords;
pub mod loader;
pub mod models;
pub mod pip;

pub use models::{MatchResult, ParentRegion, ParentTable, Point, RawPoint, Region, RegionId};
pub use pip::{AggregateReport, PipService, RegionIndex};
