use std::sync::Arc;

use axum::extract::{Extension, Json};
use serde_json::Value;

use ecosense_db::users as db_users;

use crate::{error::ApiError, state::AppState};

/// List all users. Stored passwords are never serialized.
pub async fn list(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let rows = db_users::list(&*state.db_pool).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::to_value(&rows).map_err(ApiError::from)?))
}
