use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use ecosense_db::alerts as db_alerts;

use crate::handlers::utils::path_id;
use crate::{error::ApiError, state::AppState};

pub async fn delete(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "alertId")?;

    let affected = db_alerts::delete_by_id(&*state.db_pool, id)
        .await
        .map_err(ApiError::from)?;
    if affected == 0 {
        return Err(ApiError::not_found("alert not found"));
    }

    Ok(Json(json!({ "deleted": true })))
}
