#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Json, Path, Query};
use ecosense_auth::{Argon2Hasher, Authenticator};
use ecosense_backend::state::AppState;
use ecosense_db::{create_pool, DbConnectionConfig};
use serde_json::Value;

/// App state over a fresh, fully migrated in-memory database. Hashing uses
/// cheap Argon2 costs to keep tests fast.
pub async fn test_state() -> Arc<AppState> {
    let pool = create_pool(&DbConnectionConfig::in_memory())
        .await
        .expect("create pool");
    ecosense_migrations::migrator()
        .run(&pool)
        .await
        .expect("run migrations");
    let hasher = Argon2Hasher::new().with_memory_cost(1024).with_time_cost(1);
    Arc::new(AppState::new(pool, Authenticator::new(hasher)))
}

pub fn body(value: Value) -> Option<Json<Value>> {
    Some(Json(value))
}

pub fn path(key: &str, id: i64) -> Path<HashMap<String, String>> {
    Path(HashMap::from([(key.to_string(), id.to_string())]))
}

pub fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}
