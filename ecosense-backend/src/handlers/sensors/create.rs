use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde_json::Value;

use ecosense_db::sensors::{self as db_sensors, SensorsRow};

use crate::handlers::utils::require_body;
use crate::validation::ensure_valid;
use crate::{error::ApiError, state::AppState};

use super::dto::SensorInput;

pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = require_body(body)?;
    let input: SensorInput = serde_json::from_value(payload).map_err(ApiError::from)?;
    ensure_valid(input.validate())?;

    let fields = input.into_fields();
    let id = db_sensors::insert(&*state.db_pool, &fields)
        .await
        .map_err(ApiError::from)?;
    tracing::info!(sensor_id = id, zone = %fields.zone, "created sensor");

    let row = SensorsRow::from_fields(id, fields);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(&row).map_err(ApiError::from)?),
    ))
}
