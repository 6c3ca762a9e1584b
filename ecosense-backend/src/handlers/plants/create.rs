use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::handlers::utils::require_body;
use crate::validation::ensure_valid;
use crate::{error::ApiError, state::AppState};

use super::dto::PlantInput;

/// Create a plant, optionally attached to a sensor no other plant uses.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = require_body(body)?;
    let input: PlantInput = serde_json::from_value(payload).map_err(ApiError::from)?;
    ensure_valid(input.validate())?;

    let fields = input.into_fields();
    let id = super::insert_plant(&state, &fields).await?;
    tracing::info!(plant_id = id, sensor_id = ?fields.sensor_id, "created plant");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": fields.name, "sensor_id": fields.sensor_id })),
    ))
}
