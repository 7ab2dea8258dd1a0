//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account row.
///
/// `password_hash` is the Argon2id digest in PHC string format. It
/// never leaves the server: API responses are built from the public
/// fields only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Email address (globally unique, also the token subject claim)
    pub email: String,
    /// Display name (globally unique)
    pub username: String,
    /// Salted password digest, safe to store
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
