// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public post routes (reads need no session).

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::{Comment, PostSummary};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
}

/// Post as listed in the feed.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub comments_count: i64,
    pub stars_count: i64,
}

impl From<PostSummary> for PostResponse {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            body: summary.body,
            created_at: summary.created_at,
            author: summary.author,
            comments_count: summary.comments_count,
            stars_count: summary.stars_count,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    pub author: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author: comment.author,
        }
    }
}

/// Post detail with its comments, newest first.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// List all posts, newest first.
async fn list_posts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PostResponse>>> {
    let posts = state.db.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// A single post with its comments.
async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PostDetailResponse>> {
    let post = state
        .db
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let comments = state.db.list_comments(id).await?;

    Ok(Json(PostDetailResponse {
        post: post.into(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}
