//! File loaders and exporters around the matching core.
//!
//! Regions and parent regions are read from GeoJSON; points from
//! location-history JSON exports. Exports write GeoJSON and CSV.

mod export;
mod points;
mod regions;

use std::path::PathBuf;
use thiserror::Error;

pub use export::{write_counts_csv, write_points_geojson, write_regions_geojson, ExportError};
pub use points::{load_points, parse_points};
pub use regions::{
    load_parents, load_regions, parse_parents, parse_regions, ParentSchema, RegionSchema,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("expected a GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("unrecognized point file layout")]
    UnknownPointLayout,
    #[error("no valid points found")]
    NoValidPoints,
}

/// Read a file as text, falling back to Latin-1 when it is not UTF-8.
fn read_text(path: &std::path::Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{} is not UTF-8, decoding as Latin-1", path.display());
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    })
}
