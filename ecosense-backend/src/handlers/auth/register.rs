use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde_json::Value;

use crate::handlers::utils::require_body;
use crate::{error::ApiError, state::AppState};

/// POST /auth/register
/// Accepts { name, surname, email, password } and responds 201 with the new user.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = require_body(body)?;
    let dto: super::dto::Register = serde_json::from_value(payload).map_err(ApiError::from)?;

    let store = state.credential_store();
    let outcome = state
        .authenticator()
        .register(&store, &dto.name, &dto.surname, &dto.email, &dto.password)
        .await;
    let principal = super::into_principal(outcome)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(&principal).map_err(ApiError::from)?),
    ))
}
