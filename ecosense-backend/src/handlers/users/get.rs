use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::Value;

use ecosense_db::users as db_users;

use crate::handlers::utils::path_id;
use crate::{error::ApiError, state::AppState};

/// Get a single user by id.
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "userId")?;

    let opt = db_users::find_by_id(&*state.db_pool, id)
        .await
        .map_err(ApiError::from)?;
    match opt {
        Some(row) => Ok(Json(serde_json::to_value(&row).map_err(ApiError::from)?)),
        None => Err(ApiError::not_found("user not found")),
    }
}
