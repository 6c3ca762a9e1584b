use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;

use ecosense_db::alerts as db_alerts;

use crate::handlers::utils::query_id;
use crate::{error::ApiError, state::AppState};

/// Alerts newest first, optionally for one `?sensorId=`.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let sensor_id = query_id(&query, "sensorId")?;
    let rows = db_alerts::list(&*state.db_pool, sensor_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::to_value(&rows).map_err(ApiError::from)?))
}
