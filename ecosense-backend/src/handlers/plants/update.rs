use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use crate::handlers::utils::{path_id, require_body};
use crate::validation::ensure_valid;
use crate::{error::ApiError, state::AppState};

use super::dto::PlantInput;

pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&path, "plantId")?;
    let payload = require_body(body)?;
    let input: PlantInput = serde_json::from_value(payload).map_err(ApiError::from)?;
    ensure_valid(input.validate())?;

    let fields = input.into_fields();
    if !super::update_plant(&state, id, &fields).await? {
        return Err(ApiError::not_found("plant not found"));
    }

    Ok(Json(json!({ "id": id, "name": fields.name, "sensor_id": fields.sensor_id })))
}
