// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.
//!
//! Every handler here receives the identity the auth middleware
//! resolved from the session token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::posts::CommentResponse;
use crate::AppState;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/posts/{id}/star", post(star_post))
        .route("/api/posts/{id}/comments", post(create_comment))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Get the current user's public fields.
async fn get_me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        email: user.email,
        username: user.username,
    })
}

// ─── Stars ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StarResponse {
    /// Whether the caller's star is present after the toggle
    pub starred: bool,
    pub stars_count: i64,
}

/// Toggle the caller's star on a post.
async fn star_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<StarResponse>> {
    state
        .db
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let starred = state.db.toggle_star(user.id, id).await?;
    let stars_count = state.db.stars_count(id).await?;

    Ok(Json(StarResponse {
        starred,
        stars_count,
    }))
}

// ─── Comments ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

/// Comment on a post.
async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .db
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let comment = state.db.create_comment(id, user.id, &payload.text).await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}
