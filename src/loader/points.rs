//! Raw point loading from location-history exports.

use hashbrown::HashMap;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use super::{read_text, LoadError};
use crate::coords::{NormalizedBatch, RejectReason};
use crate::models::RawPoint;

/// Load and normalize points from a JSON file.
///
/// Fails if the file cannot be read or parsed, or if no point survives
/// normalization.
pub fn load_points(path: &Path) -> Result<NormalizedBatch, LoadError> {
    info!("Loading points from {}", path.display());
    parse_points(&read_text(path)?)
}

/// Normalize points from either a timeline export
/// (`semanticSegments[].timelinePath[]`) or a bare JSON array of raw points.
pub fn parse_points(text: &str) -> Result<NormalizedBatch, LoadError> {
    let root: Value = serde_json::from_str(text)?;
    let is_timeline = root.get("semanticSegments").is_some();
    let mut batch = NormalizedBatch::default();

    match root {
        Value::Array(items) => {
            for item in items {
                push_value(&mut batch, item, HashMap::new());
            }
        }
        Value::Object(mut root) if is_timeline => {
            let segments = match root.remove("semanticSegments") {
                Some(Value::Array(segments)) => segments,
                _ => Vec::new(),
            };
            for segment in segments {
                push_segment(&mut batch, segment);
            }
        }
        _ => return Err(LoadError::UnknownPointLayout),
    }

    info!(
        "Extracted {} valid points ({} rejected)",
        batch.points.len(),
        batch.rejected_total()
    );

    if batch.points.is_empty() {
        return Err(LoadError::NoValidPoints);
    }
    Ok(batch)
}

/// Push every entry of one segment's `timelinePath`. Segments without a
/// path (visits, activities) are skipped.
fn push_segment(batch: &mut NormalizedBatch, segment: Value) {
    let Value::Object(mut segment) = segment else {
        return;
    };
    let entries = match segment.remove("timelinePath") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            debug!("Skipping timelinePath that is not an array: {}", other);
            return;
        }
        None => return,
    };
    for entry in entries {
        match entry {
            Value::Object(mut entry) => {
                let mut metadata = HashMap::new();
                if let Some(time) = entry_time(&entry) {
                    metadata.insert("timestamp".to_string(), time);
                }
                let point = entry.remove("point").unwrap_or(Value::Null);
                push_value(batch, point, metadata);
            }
            _ => batch.reject(RejectReason::MissingFields),
        }
    }
}

/// `time` or `timestamp`, as a string; numbers are stringified
fn entry_time(entry: &serde_json::Map<String, Value>) -> Option<String> {
    ["time", "timestamp"]
        .iter()
        .filter_map(|key| entry.get(*key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn push_value(batch: &mut NormalizedBatch, value: Value, metadata: HashMap<String, String>) {
    if value.is_null() {
        batch.reject(RejectReason::MissingFields);
        return;
    }
    match serde_json::from_value::<RawPoint>(value) {
        Ok(raw) => {
            batch.push_with_metadata(&raw, metadata);
        }
        Err(_) => batch.reject(RejectReason::ParseError),
    }
}
