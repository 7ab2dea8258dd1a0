// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use blog_api::config::Config;
use blog_api::db::Db;
use blog_api::routes::create_router;
use blog_api::services::{AccountService, TokenService};
use blog_api::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let db = Db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let tokens = TokenService::from_config(&config).expect("Failed to load test signing keys");
    let accounts =
        AccountService::new(db.clone(), tokens).expect("Failed to build account service");

    let state = Arc::new(AppState {
        config,
        db,
        accounts,
    });

    (create_router(state.clone()), state)
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}

/// Register an account and log in, returning the session token.
#[allow(dead_code)]
pub async fn register_and_login(
    app: &axum::Router,
    email: &str,
    username: &str,
    password: &str,
) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({"email": email, "username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "registration failed: {}",
        response.status()
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            serde_json::json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "login failed: {}",
        response.status()
    );

    let body = body_json(response).await;
    body["token"].as_str().expect("token in body").to_string()
}
