// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These verify that:
//! 1. Protected routes reject requests without a resolvable identity
//! 2. Protected routes accept the session token from cookie or header
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use blog_api::services::TokenService;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, register_and_login};

#[tokio::test]
async fn test_protected_route_rejects_anonymous() {
    let (app, _state) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_accepts_bearer_token() {
    let (app, _state) = create_test_app().await;
    let token = register_and_login(&app, "a@x.com", "alice", "secret").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_protected_route_accepts_session_cookie() {
    let (app, _state) = create_test_app().await;
    let token = register_and_login(&app, "a@x.com", "alice", "secret").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("blog_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_rejects_invalid_token() {
    let (app, _state) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_valid_token_for_unknown_subject_rejected() {
    let (app, state) = create_test_app().await;

    // Correctly signed, but the subject has no account.
    let tokens = TokenService::from_config(&state.config).unwrap();
    let issued = tokens.issue("ghost@x.com").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _state) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/auth/login")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|h| h.to_str().ok()),
        Some("http://localhost:5173")
    );
}
