//! Issued-token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A token issued at login.
///
/// Holds the SHA-256 fingerprint of the signed token, never the token
/// itself. Identity resolution verifies the token signature directly
/// and does not read this table; the record exists for audit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenRecord {
    pub id: i64,
    /// Email the token was issued for
    pub email: String,
    /// SHA-256 hex fingerprint of the signed token
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
