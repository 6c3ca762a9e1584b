use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde_json::{json, Value};

use ecosense_db::alerts::{self as db_alerts, AlertsRow, KIND_LOW_HUMIDITY};
use ecosense_db::readings::{self as db_readings, ReadingsRow};
use ecosense_db::sensors as db_sensors;

use crate::handlers::utils::{now_timestamp, require_body};
use crate::validation::ensure_valid;
use crate::{error::ApiError, state::AppState};

use super::dto::{is_below_threshold, ReadingInput};

/// Record a humidity reading with a server-assigned timestamp.
///
/// When the sensor has a threshold and the value falls below it, a
/// `low_humidity` alert with the same timestamp is written in the same
/// transaction and returned next to the reading.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = require_body(body)?;
    let input: ReadingInput = serde_json::from_value(payload).map_err(ApiError::from)?;
    ensure_valid(input.validate())?;
    let (Some(sensor_id), Some(value)) = (input.sensor_id, input.value) else {
        return Err(ApiError::bad_request("sensor_id and value are required"));
    };

    let mut tx = state.db_pool.begin().await.map_err(ApiError::from)?;
    let sensor = db_sensors::find_by_id(&mut *tx, sensor_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("sensor not found"))?;

    let recorded_at = now_timestamp();
    let id = db_readings::insert(&mut *tx, sensor_id, value, &recorded_at)
        .await
        .map_err(ApiError::from)?;

    let alert = if is_below_threshold(value, sensor.humidity_threshold) {
        let alert_id = db_alerts::insert(&mut *tx, sensor_id, &recorded_at, value, KIND_LOW_HUMIDITY)
            .await
            .map_err(ApiError::from)?;
        tracing::warn!(
            sensor_id,
            value,
            threshold = ?sensor.humidity_threshold,
            "humidity below threshold"
        );
        Some(AlertsRow {
            id: alert_id,
            sensor_id,
            recorded_at: recorded_at.clone(),
            value,
            kind: KIND_LOW_HUMIDITY.to_owned(),
        })
    } else {
        None
    };
    tx.commit().await.map_err(ApiError::from)?;

    let reading = ReadingsRow {
        id,
        sensor_id,
        value,
        recorded_at,
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({ "reading": reading, "alert": alert })),
    ))
}
