use std::collections::HashMap;

use axum::Json;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::ApiError;

pub fn parse_positive_usize(
    raw: Option<&String>,
    fallback: usize,
    field: &str,
) -> Result<usize, ApiError> {
    match raw {
        Some(value) => {
            let parsed = value.parse::<usize>().map_err(|_| {
                ApiError::bad_request(format!("{field} must be a positive integer"))
            })?;
            if parsed == 0 {
                return Err(ApiError::bad_request(format!("{field} must be at least 1")));
            }
            Ok(parsed)
        }
        None => Ok(fallback),
    }
}

/// Unwrap an optional JSON body, rejecting requests without one.
pub fn require_body(body: Option<Json<Value>>) -> Result<Value, ApiError> {
    body.map(|Json(v)| v)
        .ok_or_else(|| ApiError::bad_request("missing request body"))
}

/// Numeric id from a path segment.
pub fn path_id(path: &HashMap<String, String>, key: &str) -> Result<i64, ApiError> {
    let raw = path
        .get(key)
        .ok_or_else(|| ApiError::not_found(format!("{key} missing")))?;
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("{key} must be an integer")))
}

/// Optional numeric id from a query parameter. Blank values count as absent.
pub fn query_id(query: &HashMap<String, String>, key: &str) -> Result<Option<i64>, ApiError> {
    match query.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("{key} must be an integer"))),
        None => Ok(None),
    }
}

/// Current time in the stored timestamp format: RFC 3339, UTC, millisecond precision.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Which end of a date range a bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdge {
    Start,
    End,
}

/// Parse a `startDate`/`endDate` filter into the stored timestamp format.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date. A bare date
/// covers the whole day, so as an end bound it means the last millisecond of it.
pub fn parse_date_bound(raw: &str, edge: RangeEdge, field: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(format_timestamp(at.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::bad_request(format!("{field} must be an RFC 3339 timestamp or YYYY-MM-DD"))
    })?;
    let (h, m, s, ms) = match edge {
        RangeEdge::Start => (0, 0, 0, 0),
        RangeEdge::End => (23, 59, 59, 999),
    };
    let at = date
        .and_hms_milli_opt(h, m, s, ms)
        .ok_or_else(|| ApiError::bad_request(format!("{field} is out of range")))?;
    Ok(format_timestamp(at.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_usize_rules() {
        assert_eq!(parse_positive_usize(None, 100, "limit").unwrap(), 100);
        assert_eq!(
            parse_positive_usize(Some(&"5".to_string()), 100, "limit").unwrap(),
            5
        );
        assert!(parse_positive_usize(Some(&"0".to_string()), 100, "limit").is_err());
        assert!(parse_positive_usize(Some(&"-3".to_string()), 100, "limit").is_err());
    }

    #[test]
    fn date_only_bounds_cover_the_day() {
        assert_eq!(
            parse_date_bound("2025-03-01", RangeEdge::Start, "startDate").unwrap(),
            "2025-03-01T00:00:00.000Z"
        );
        assert_eq!(
            parse_date_bound("2025-03-01", RangeEdge::End, "endDate").unwrap(),
            "2025-03-01T23:59:59.999Z"
        );
    }

    #[test]
    fn rfc3339_bounds_are_normalized_to_utc() {
        assert_eq!(
            parse_date_bound("2025-03-01T12:00:00+02:00", RangeEdge::Start, "startDate").unwrap(),
            "2025-03-01T10:00:00.000Z"
        );
        assert!(parse_date_bound("yesterday", RangeEdge::End, "endDate").is_err());
    }

    #[test]
    fn query_ids() {
        let mut q = HashMap::new();
        q.insert("sensorId".to_string(), "7".to_string());
        q.insert("blank".to_string(), " ".to_string());
        q.insert("bad".to_string(), "x".to_string());
        assert_eq!(query_id(&q, "sensorId").unwrap(), Some(7));
        assert_eq!(query_id(&q, "blank").unwrap(), None);
        assert_eq!(query_id(&q, "missing").unwrap(), None);
        assert!(query_id(&q, "bad").is_err());
    }
}
