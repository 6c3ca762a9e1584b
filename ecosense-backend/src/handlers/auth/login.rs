use std::sync::Arc;

use axum::extract::{Extension, Json};
use serde_json::Value;

use crate::handlers::utils::require_body;
use crate::{error::ApiError, state::AppState};

/// POST /auth/login
/// Accepts { email, password }. Legacy plaintext passwords are upgraded to
/// Argon2 hashes as a side effect of a successful login.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = require_body(body)?;
    let dto: super::dto::Login = serde_json::from_value(payload).map_err(ApiError::from)?;

    let store = state.credential_store();
    let outcome = state
        .authenticator()
        .verify_and_migrate(&store, &dto.email, &dto.password)
        .await;
    let principal = super::into_principal(outcome)?;

    tracing::info!(user_id = principal.user_id, "login succeeded");
    Ok(Json(serde_json::to_value(&principal).map_err(ApiError::from)?))
}
