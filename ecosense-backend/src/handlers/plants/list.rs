use std::sync::Arc;

use axum::extract::{Extension, Json};
use serde_json::Value;

use ecosense_db::plants as db_plants;

use crate::{error::ApiError, state::AppState};

pub async fn list(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let rows = db_plants::list(&*state.db_pool).await.map_err(ApiError::from)?;
    Ok(Json(serde_json::to_value(&rows).map_err(ApiError::from)?))
}
