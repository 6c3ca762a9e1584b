mod common;

use std::net::Ipv4Addr;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use ecosense_backend::build_router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::test_state;

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_json(uri: &str, value: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_ready_and_root() {
    let router = build_router(test_state().await);

    let health = router
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let ready = router
        .clone()
        .oneshot(Request::get("/api/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    let root = router
        .oneshot(Request::get("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(json_body(root).await, json!({ "name": "ECOSENSE API" }));
}

#[tokio::test]
async fn register_and_login_over_http() {
    let router = build_router(test_state().await);

    let created = router
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "jo", "surname": "doe", "email": "jo@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let duplicate = router
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "jo", "surname": "doe", "email": "jo@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(duplicate).await["error"], "email already registered");

    let login = router
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "jo@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    assert_eq!(json_body(login).await["name"], "Jo");

    let wrong = router
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "jo@x.com", "password": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let router = build_router(test_state().await);
    let resp = router
        .oneshot(
            Request::get("/api/health")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let router = build_router(test_state().await);
    let resp = router
        .oneshot(Request::get("/api/nothing-here").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn startup_binds_and_serves_health() {
    let router = build_router(test_state().await);

    // Bind to ephemeral port
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("serve");
    });

    let client = reqwest::Client::new();
    let health = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .expect("health request");
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let root: Value = client
        .get(format!("http://{addr}/api"))
        .send()
        .await
        .expect("root request")
        .json()
        .await
        .expect("root json");
    assert_eq!(root["name"], "ECOSENSE API");

    handle.abort();
}
