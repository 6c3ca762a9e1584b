use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use ecosense_db::sensors as db_sensors;

use crate::handlers::utils::path_id;
use crate::{error::ApiError, state::AppState};

/// Delete a sensor. Its readings and alerts go with it; a plant it was
/// watching is kept with no sensor.
pub async fn delete(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "sensorId")?;

    let affected = db_sensors::delete_by_id(&*state.db_pool, id)
        .await
        .map_err(ApiError::from)?;
    if affected == 0 {
        return Err(ApiError::not_found("sensor not found"));
    }

    tracing::info!(sensor_id = id, "deleted sensor");
    Ok(Json(json!({ "deleted": true })))
}
