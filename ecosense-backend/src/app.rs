use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ecosense_config::CorsConfig;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{alerts, auth, plants, readings, sensors, users};
use crate::state::AppState;

/// Surface settings that come from configuration rather than state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors: CorsConfig,
    pub static_dir: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        let cfg = ecosense_config::Config::default();
        Self {
            cors: cfg.cors,
            static_dir: cfg.static_files.directory,
        }
    }
}

/// Build the primary axum router with default CORS and static settings.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with_options(state, &RouterOptions::default())
}

pub fn build_router_with_options(state: Arc<AppState>, options: &RouterOptions) -> Router {
    let api = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/auth/login", post(auth::login::login))
        .route("/auth/register", post(auth::register::register))
        .route("/users", get(users::list::list))
        .route(
            "/users/{userId}",
            get(users::get::get).delete(users::delete::delete),
        )
        .route(
            "/sensors",
            post(sensors::create::create).get(sensors::list::list),
        )
        .route(
            "/sensors/{sensorId}",
            get(sensors::get::get)
                .put(sensors::update::update)
                .delete(sensors::delete::delete),
        )
        .route("/plants", post(plants::create::create).get(plants::list::list))
        .route("/plants/zones", get(plants::zones::zones))
        .route(
            "/plants/{plantId}",
            get(plants::get::get)
                .put(plants::update::update)
                .delete(plants::delete::delete),
        )
        .route(
            "/readings",
            post(readings::create::create).get(readings::list::list),
        )
        .route("/alerts", post(alerts::create::create).get(alerts::list::list))
        .route("/alerts/{alertId}", axum::routing::delete(alerts::delete::delete))
        .layer(Extension(state));

    // Serve static files from the configured directory for non-API routes
    let static_service = ServeDir::new(&options.static_dir);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_service)
        .layer(cors_layer(&options.cors))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy from configuration. Origins that are not valid header values
/// are skipped with a warning.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cfg.allow_all_origins {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%origin, %error, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "name": "ECOSENSE API" }))
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always return 200 OK when process is alive.
    (StatusCode::OK, "OK")
}

async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&*state.db_pool).await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(error) => {
            tracing::warn!(%error, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
