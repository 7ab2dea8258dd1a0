// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account storage, uniqueness enforcement)
//! - Tokens (issued-token audit records)
//! - Posts, comments, and stars (the blog surface)
//!
//! The handle is opened once at process start, injected through shared
//! state, and closed after shutdown. Email and username uniqueness is
//! enforced by the schema; a unique violation surfaces as `Conflict`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;
use crate::models::{Comment, Post, PostSummary, TokenRecord, User};

/// Database handle (SQLite connection pool).
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open the database and run pending migrations.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        Self::migrate(pool).await
    }

    /// Open a fresh in-memory database (tests).
    ///
    /// A single pinned connection keeps every pool checkout on the
    /// same in-memory database for the life of the handle.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Close the pool. Called after graceful shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    /// Insert a new user.
    ///
    /// The schema enforces email/username uniqueness, so two racing
    /// registrations for the same email resolve here: one row is
    /// written, the loser gets `Conflict`.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("User {} vanished after insert", id)))
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Record an issued token by its fingerprint.
    pub async fn create_token(
        &self,
        email: &str,
        token_hash: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tokens (email, token_hash, issued_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(token_hash)
        .bind(issued_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    pub async fn get_token_by_fingerprint(
        &self,
        token_hash: &str,
    ) -> Result<Option<TokenRecord>, AppError> {
        sqlx::query_as::<_, TokenRecord>("SELECT * FROM tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn create_post(&self, user_id: i64, title: &str, body: &str) -> Result<Post, AppError> {
        let result = sqlx::query(
            "INSERT INTO posts (user_id, title, body, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    /// List posts, newest first, with author and reaction counts.
    pub async fn list_posts(&self) -> Result<Vec<PostSummary>, AppError> {
        let query = format!("{} ORDER BY p.created_at DESC, p.id DESC", POST_SUMMARY_BASE);
        sqlx::query_as::<_, PostSummary>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<PostSummary>, AppError> {
        let query = format!("{} WHERE p.id = ?", POST_SUMMARY_BASE);
        sqlx::query_as::<_, PostSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    // ─── Comment Operations ──────────────────────────────────────

    pub async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, AppError> {
        let result = sqlx::query(
            "INSERT INTO comments (post_id, user_id, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.post_id, c.text, c.created_at, u.username AS author \
             FROM comments c JOIN users u ON u.id = c.user_id WHERE c.id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Comments on a post, newest first.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.post_id, c.text, c.created_at, u.username AS author \
             FROM comments c JOIN users u ON u.id = c.user_id \
             WHERE c.post_id = ? ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    // ─── Star Operations ─────────────────────────────────────────

    /// Toggle the caller's star on a post. Returns true if the post is
    /// starred after the call.
    pub async fn toggle_star(&self, user_id: i64, post_id: i64) -> Result<bool, AppError> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM stars WHERE user_id = ? AND post_id = ?")
                .bind(user_id)
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        match existing {
            Some((id,)) => {
                sqlx::query("DELETE FROM stars WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?;
                Ok(false)
            }
            None => {
                sqlx::query("INSERT INTO stars (user_id, post_id, created_at) VALUES (?, ?, ?)")
                    .bind(user_id)
                    .bind(post_id)
                    .bind(Utc::now())
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?;
                Ok(true)
            }
        }
    }

    pub async fn stars_count(&self, post_id: i64) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stars WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count)
    }
}

const POST_SUMMARY_BASE: &str =
    "SELECT p.id, p.title, p.body, p.created_at, u.username AS author, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count, \
     (SELECT COUNT(*) FROM stars s WHERE s.post_id = p.id) AS stars_count \
     FROM posts p JOIN users u ON u.id = p.user_id";

/// Map sqlx errors, turning schema-level unique violations into the
/// conflict the registration flow reports.
fn db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::Conflict("email or username already in use".to_string());
        }
    }
    AppError::Database(e.to_string())
}
