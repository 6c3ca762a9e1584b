use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Query};
use serde_json::Value;

use ecosense_db::sensors as db_sensors;

use crate::{error::ApiError, state::AppState};

/// List sensors, optionally only those in `?zone=`.
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let zone = query
        .get("zone")
        .map(|z| z.trim())
        .filter(|z| !z.is_empty());

    let rows = db_sensors::list(&*state.db_pool, zone)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(serde_json::to_value(&rows).map_err(ApiError::from)?))
}
