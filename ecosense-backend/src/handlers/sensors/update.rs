use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::Value;

use ecosense_db::sensors::{self as db_sensors, SensorsRow};

use crate::handlers::utils::{path_id, require_body};
use crate::validation::ensure_valid;
use crate::{error::ApiError, state::AppState};

use super::dto::SensorInput;

/// Replace every writable column of a sensor.
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "sensorId")?;
    let payload = require_body(body)?;
    let input: SensorInput = serde_json::from_value(payload).map_err(ApiError::from)?;
    ensure_valid(input.validate())?;

    let fields = input.into_fields();
    let affected = db_sensors::update(&*state.db_pool, id, &fields)
        .await
        .map_err(ApiError::from)?;
    if affected == 0 {
        return Err(ApiError::not_found("sensor not found"));
    }

    let row = SensorsRow::from_fields(id, fields);
    Ok(Json(serde_json::to_value(&row).map_err(ApiError::from)?))
}
