use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use ecosense_db::alerts::{self as db_alerts, AlertsRow, KIND_LOW_HUMIDITY};
use ecosense_db::sensors as db_sensors;

use crate::handlers::utils::{now_timestamp, require_body};
use crate::validation::{ensure_valid, ValidationIssue};
use crate::{error::ApiError, state::AppState};

/// Body of `POST /alerts`. `kind` defaults to `low_humidity`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertInput {
    pub sensor_id: Option<i64>,
    pub value: Option<f64>,
    pub kind: Option<String>,
}

pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = require_body(body)?;
    let input: AlertInput = serde_json::from_value(payload).map_err(ApiError::from)?;

    let mut issues = Vec::new();
    if input.sensor_id.is_none() {
        issues.push(ValidationIssue::new("sensor_id", "missing", "sensor_id is required"));
    }
    if input.value.is_none() {
        issues.push(ValidationIssue::new("value", "missing", "value is required"));
    }
    let kind = input
        .kind
        .as_deref()
        .map(str::trim)
        .unwrap_or(KIND_LOW_HUMIDITY)
        .to_owned();
    if kind.is_empty() {
        issues.push(ValidationIssue::new("kind", "missing", "kind cannot be empty"));
    }
    ensure_valid(issues)?;
    let (Some(sensor_id), Some(value)) = (input.sensor_id, input.value) else {
        return Err(ApiError::bad_request("sensor_id and value are required"));
    };

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    if db_sensors::find_by_id(&mut *conn, sensor_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("sensor not found"));
    }

    let recorded_at = now_timestamp();
    let id = db_alerts::insert(&mut *conn, sensor_id, &recorded_at, value, &kind)
        .await
        .map_err(ApiError::from)?;

    let row = AlertsRow {
        id,
        sensor_id,
        recorded_at,
        value,
        kind,
    };
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(&row).map_err(ApiError::from)?),
    ))
}
