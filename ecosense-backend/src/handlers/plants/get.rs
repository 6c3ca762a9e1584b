use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::Value;

use ecosense_db::plants as db_plants;

use crate::handlers::utils::path_id;
use crate::{error::ApiError, state::AppState};

pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "plantId")?;

    match db_plants::find_by_id(&*state.db_pool, id)
        .await
        .map_err(ApiError::from)?
    {
        Some(row) => Ok(Json(serde_json::to_value(&row).map_err(ApiError::from)?)),
        None => Err(ApiError::not_found("plant not found")),
    }
}
