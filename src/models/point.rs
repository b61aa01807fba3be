//! Canonical point type and the raw shapes it is normalized from.

use geo::Coord;
use serde::{Deserialize, Serialize};
use hashbrown::HashMap;

/// A validated observation in WGS84 degrees.
///
/// Only constructed through [`crate::coords::normalize`], so latitude is always
/// within `[-90, 90]` and longitude within `[-180, 180]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    metadata: HashMap<String, String>,
}

impl Point {
    pub(crate) fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            metadata: HashMap::new(),
        }
    }

    /// Attach metadata (e.g. a timestamp) to the point.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Planar coordinate, x = longitude, y = latitude
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// Record form of a raw point: `{"latitude": .., "longitude": ..}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoordinateRecord {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A point as found in input data, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPoint {
    /// Two named numeric fields
    Record(CoordinateRecord),
    /// `"{lat}, {lon}"` or `"{lat}°, {lon}°"`
    Text(String),
}

impl From<&str> for RawPoint {
    fn from(s: &str) -> Self {
        RawPoint::Text(s.to_string())
    }
}

impl From<(f64, f64)> for RawPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        RawPoint::Record(CoordinateRecord {
            latitude: Some(latitude),
            longitude: Some(longitude),
        })
    }
}
