//! GeoJSON and CSV exports of match results.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{MatchResult, Point};
use crate::pip::RegionIndex;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn feature(geometry: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn write_collection(path: &Path, features: Vec<Feature>) -> Result<(), ExportError> {
    let count = features.len();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let mut writer = create(path)?;
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("Wrote {} features to {}", count, path.display());
    Ok(())
}

/// Matched regions with their boundaries and `point_count`, `parent_key`
/// and `name` properties.
pub fn write_regions_geojson(
    path: &Path,
    index: &RegionIndex,
    result: &MatchResult,
) -> Result<(), ExportError> {
    let features = index
        .regions()
        .iter()
        .filter_map(|region| {
            let matched = result.region(region.id.as_str())?;
            let mut props = JsonObject::new();
            props.insert("id".into(), Value::from(region.id.as_str()));
            props.insert("parent_key".into(), Value::from(region.parent_key.as_str()));
            if let Some(name) = &region.name {
                props.insert("name".into(), Value::from(name.as_str()));
            }
            props.insert("point_count".into(), Value::from(matched.point_count));
            Some(feature(GeoValue::from(&region.boundary), props))
        })
        .collect();
    write_collection(path, features)
}

/// Normalized points with `latitude`, `longitude` and metadata properties.
pub fn write_points_geojson(path: &Path, points: &[Point]) -> Result<(), ExportError> {
    let features = points
        .iter()
        .map(|p| {
            let mut props = JsonObject::new();
            props.insert("latitude".into(), Value::from(p.latitude()));
            props.insert("longitude".into(), Value::from(p.longitude()));
            for (key, value) in p.metadata() {
                props.insert(key.clone(), Value::from(value.as_str()));
            }
            feature(GeoValue::Point(vec![p.longitude(), p.latitude()]), props)
        })
        .collect();
    write_collection(path, features)
}

#[derive(Serialize)]
struct CountRow<'a> {
    id: &'a str,
    name: &'a str,
    parent_key: &'a str,
    point_count: u64,
}

/// One CSV row per matched region, ascending by id.
pub fn write_counts_csv(path: &Path, result: &MatchResult) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    for region in &result.matched_regions {
        writer.serialize(CountRow {
            id: region.id.as_str(),
            name: region.name.as_deref().unwrap_or(""),
            parent_key: &region.parent_key,
            point_count: region.point_count,
        })?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        "Wrote {} region counts to {}",
        result.matched_regions.len(),
        path.display()
    );
    Ok(())
}
