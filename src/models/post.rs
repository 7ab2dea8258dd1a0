// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post, comment, and star models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author and reaction counts, as listed by the
/// read endpoints.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Author username
    pub author: String,
    pub comments_count: i64,
    pub stars_count: i64,
}

/// Comment joined with its author username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
}
