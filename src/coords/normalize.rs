//! Normalization of raw point representations into [`Point`].

use serde::Serialize;
use std::fmt;

use crate::models::{CoordinateRecord, Point, RawPoint};

const DEGREE_SIGN: char = '°';

/// Why a raw point was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// A field was not a finite number, or text had the wrong number of fields
    ParseError,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    RangeError,
    /// A required field was absent, null or blank
    MissingFields,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::ParseError => "PARSE_ERROR",
            RejectReason::RangeError => "RANGE_ERROR",
            RejectReason::MissingFields => "MISSING_FIELDS",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A raw point that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub reason: RejectReason,
}

impl Rejected {
    fn new(reason: RejectReason) -> Self {
        Self { reason }
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point rejected: {}", self.reason)
    }
}

/// Normalize a raw point into a validated [`Point`].
///
/// Accepts a latitude/longitude record, `"{lat}, {lon}"`, or
/// `"{lat}°, {lon}°"`. Never panics; every failure is a [`Rejected`].
pub fn normalize(raw: &RawPoint) -> Result<Point, Rejected> {
    let (lat, lon) = match raw {
        RawPoint::Record(record) => from_record(record)?,
        RawPoint::Text(text) => from_text(text)?,
    };
    validated(lat, lon)
}

fn from_record(record: &CoordinateRecord) -> Result<(f64, f64), Rejected> {
    match (record.latitude, record.longitude) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(Rejected::new(RejectReason::MissingFields)),
    }
}

fn from_text(text: &str) -> Result<(f64, f64), Rejected> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Rejected::new(RejectReason::MissingFields));
    }

    let stripped: String = text.chars().filter(|c| *c != DEGREE_SIGN).collect();
    let fields: Vec<&str> = stripped.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(Rejected::new(RejectReason::ParseError));
    }
    if fields.iter().any(|f| f.is_empty()) {
        return Err(Rejected::new(RejectReason::MissingFields));
    }

    Ok((parse_number(fields[0])?, parse_number(fields[1])?))
}

fn parse_number(field: &str) -> Result<f64, Rejected> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Rejected::new(RejectReason::ParseError)),
    }
}

fn validated(lat: f64, lon: f64) -> Result<Point, Rejected> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(Rejected::new(RejectReason::ParseError));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Rejected::new(RejectReason::RangeError));
    }
    Ok(Point::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(raw: RawPoint) -> RejectReason {
        normalize(&raw).unwrap_err().reason
    }

    #[test]
    fn test_plain_text() {
        let p = normalize(&"40.7128, -74.0060".into()).unwrap();
        assert_eq!(p.latitude(), 40.7128);
        assert_eq!(p.longitude(), -74.0060);
    }

    #[test]
    fn test_all_shapes_agree() {
        let plain = normalize(&"40.7128, -74.0060".into()).unwrap();
        let degrees = normalize(&"40.7128°, -74.0060°".into()).unwrap();
        let record: RawPoint =
            serde_json::from_str(r#"{"latitude": 40.7128, "longitude": -74.0060}"#).unwrap();
        let record = normalize(&record).unwrap();
        assert_eq!(plain, degrees);
        assert!((plain.latitude() - record.latitude()).abs() < 1e-12);
        assert!((plain.longitude() - record.longitude()).abs() < 1e-12);
    }

    #[test]
    fn test_surrounding_whitespace() {
        let p = normalize(&"  12.5 ,3.25  ".into()).unwrap();
        assert_eq!(p.latitude(), 12.5);
        assert_eq!(p.longitude(), 3.25);
    }

    #[test]
    fn test_range_errors() {
        assert_eq!(reason("91.0, 0.0".into()), RejectReason::RangeError);
        assert_eq!(reason("0.0, 180.5".into()), RejectReason::RangeError);
        assert_eq!(reason("-90.1°, 0°".into()), RejectReason::RangeError);
        assert_eq!(reason((0.0, -181.0).into()), RejectReason::RangeError);
    }

    #[test]
    fn test_range_is_inclusive() {
        assert!(normalize(&"90, 180".into()).is_ok());
        assert!(normalize(&"-90, -180".into()).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(reason("not-a-number, 5".into()), RejectReason::ParseError);
        assert_eq!(reason("1, 2, 3".into()), RejectReason::ParseError);
        assert_eq!(reason("12.5".into()), RejectReason::ParseError);
        assert_eq!(reason("NaN, 5".into()), RejectReason::ParseError);
        assert_eq!(reason("inf, 5".into()), RejectReason::ParseError);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(reason("".into()), RejectReason::MissingFields);
        assert_eq!(reason("   ".into()), RejectReason::MissingFields);
        assert_eq!(reason(", 5".into()), RejectReason::MissingFields);

        let record: RawPoint = serde_json::from_str(r#"{"latitude": 40.0}"#).unwrap();
        assert_eq!(reason(record), RejectReason::MissingFields);

        let record: RawPoint =
            serde_json::from_str(r#"{"latitude": null, "longitude": 3.0}"#).unwrap();
        assert_eq!(reason(record), RejectReason::MissingFields);
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(RejectReason::ParseError.code(), "PARSE_ERROR");
        assert_eq!(RejectReason::RangeError.to_string(), "RANGE_ERROR");
        assert_eq!(
            serde_json::to_string(&RejectReason::MissingFields).unwrap(),
            "\"MISSING_FIELDS\""
        );
    }
}
