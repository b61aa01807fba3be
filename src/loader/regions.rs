//! Region and parent region loading from GeoJSON feature collections.

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use super::{read_text, LoadError};
use crate::models::{ParentRegion, ParentTable, Region};

/// Property names carrying region attributes.
///
/// Defaults follow the US Census TIGER county attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegionSchema {
    pub id_property: String,
    pub parent_property: String,
    pub name_property: Option<String>,
}

impl Default for RegionSchema {
    fn default() -> Self {
        Self {
            id_property: "GEOID".to_string(),
            parent_property: "STATEFP".to_string(),
            name_property: Some("NAME".to_string()),
        }
    }
}

/// Property names carrying parent region attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParentSchema {
    pub key_property: String,
    pub name_property: String,
}

impl Default for ParentSchema {
    fn default() -> Self {
        Self {
            key_property: "STATEFP".to_string(),
            name_property: "NAME".to_string(),
        }
    }
}

pub fn load_regions(path: &Path, schema: &RegionSchema) -> Result<Vec<Region>, LoadError> {
    info!("Loading regions from {}", path.display());
    parse_regions(&read_text(path)?, schema)
}

pub fn load_parents(path: &Path, schema: &ParentSchema) -> Result<ParentTable, LoadError> {
    info!("Loading parent regions from {}", path.display());
    parse_parents(&read_text(path)?, schema)
}

/// Parse Polygon/MultiPolygon features into regions.
///
/// Features without an id or a polygonal geometry are skipped with a
/// warning. Geometry validity is checked later, at index build.
pub fn parse_regions(text: &str, schema: &RegionSchema) -> Result<Vec<Region>, LoadError> {
    let features = feature_collection(text)?;
    let total = features.len();
    let mut regions = Vec::with_capacity(total);

    for (i, feature) in features.into_iter().enumerate() {
        let Some(id) = property_string(&feature, &schema.id_property) else {
            warn!("Feature {} has no '{}' property, skipping", i, schema.id_property);
            continue;
        };
        let parent_key = property_string(&feature, &schema.parent_property).unwrap_or_default();
        let name = schema
            .name_property
            .as_deref()
            .and_then(|p| property_string(&feature, p));

        let Some(boundary) = feature_boundary(feature) else {
            warn!("Region {} has no polygonal geometry, skipping", id);
            continue;
        };

        let mut region = Region::new(id, parent_key, boundary);
        region.name = name;
        regions.push(region);
    }

    info!("Loaded {} of {} region features", regions.len(), total);
    Ok(regions)
}

/// Parse a parent lookup table; feature geometry is ignored.
pub fn parse_parents(text: &str, schema: &ParentSchema) -> Result<ParentTable, LoadError> {
    let features = feature_collection(text)?;
    let mut table = ParentTable::new();

    for feature in &features {
        let key = property_string(feature, &schema.key_property);
        let name = property_string(feature, &schema.name_property);
        match (key, name) {
            (Some(key), Some(name)) => table.insert(ParentRegion { key, name }),
            _ => warn!(
                "Parent feature missing '{}' or '{}', skipping",
                schema.key_property, schema.name_property
            ),
        }
    }

    info!("Loaded {} parent regions", table.len());
    Ok(table)
}

fn feature_collection(text: &str) -> Result<Vec<Feature>, LoadError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        _ => Err(LoadError::NotAFeatureCollection),
    }
}

/// String or number property as text; empty strings count as absent
fn property_string(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_boundary(feature: Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry?;
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}
