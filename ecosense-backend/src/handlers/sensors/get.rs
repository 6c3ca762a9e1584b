use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use ecosense_db::{plants as db_plants, readings as db_readings, sensors as db_sensors};

use crate::handlers::utils::path_id;
use crate::{error::ApiError, state::AppState};

/// Readings included in the sensor detail view.
const DETAIL_READINGS: u32 = 10;

/// Sensor detail: the sensor, its latest readings (newest first) and the
/// plant it watches, if any.
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "sensorId")?;

    let mut conn = state.db_pool.acquire().await.map_err(ApiError::from)?;
    let sensor = db_sensors::find_by_id(&mut *conn, id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("sensor not found"))?;
    let readings = db_readings::latest_for_sensor(&mut *conn, id, DETAIL_READINGS)
        .await
        .map_err(ApiError::from)?;
    let plant = db_plants::find_by_sensor(&mut *conn, id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({
        "sensor": sensor,
        "readings": readings,
        "plant": plant,
    })))
}
