use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;

use ecosense_db::readings::{self as db_readings, ReadingFilter};

use crate::handlers::utils::{parse_date_bound, parse_positive_usize, query_id, RangeEdge};
use crate::{error::ApiError, state::AppState};

const DEFAULT_LIMIT: usize = 100;

/// GET /readings?sensorId=&startDate=&endDate=&limit=
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter_from_query(&query)?;
    let rows = db_readings::list(&*state.db_pool, &filter)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::to_value(&rows).map_err(ApiError::from)?))
}

pub fn filter_from_query(query: &HashMap<String, String>) -> Result<ReadingFilter, ApiError> {
    let limit = parse_positive_usize(query.get("limit"), DEFAULT_LIMIT, "limit")?;
    let bound = |key: &str, edge| {
        query
            .get(key)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_date_bound(raw, edge, key))
            .transpose()
    };

    let filter = ReadingFilter {
        sensor_id: query_id(query, "sensorId")?,
        start: bound("startDate", RangeEdge::Start)?,
        end: bound("endDate", RangeEdge::End)?,
        limit: u32::try_from(limit).unwrap_or(u32::MAX),
    };
    if let (Some(start), Some(end)) = (&filter.start, &filter.end) {
        if start > end {
            return Err(ApiError::bad_request("startDate must not be after endDate"));
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let filter = filter_from_query(&HashMap::new()).unwrap();
        assert_eq!(filter.limit, 100);
        assert!(filter.sensor_id.is_none() && filter.start.is_none() && filter.end.is_none());
    }

    #[test]
    fn full_query() {
        let filter = filter_from_query(&query(&[
            ("sensorId", "3"),
            ("startDate", "2025-03-01"),
            ("endDate", "2025-03-02"),
            ("limit", "5"),
        ]))
        .unwrap();
        assert_eq!(filter.sensor_id, Some(3));
        assert_eq!(filter.start.as_deref(), Some("2025-03-01T00:00:00.000Z"));
        assert_eq!(filter.end.as_deref(), Some("2025-03-02T23:59:59.999Z"));
        assert_eq!(filter.limit, 5);
    }

    #[test]
    fn rejects_bad_limit_and_inverted_range() {
        assert!(filter_from_query(&query(&[("limit", "0")])).is_err());
        assert!(filter_from_query(&query(&[
            ("startDate", "2025-03-05"),
            ("endDate", "2025-03-01"),
        ]))
        .is_err());
    }
}
