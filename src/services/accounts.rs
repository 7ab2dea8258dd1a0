// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account flows: registration, login, and per-request identity
//! resolution.
//!
//! Identity is always resolved from the signed token: verify the
//! signature, check expiry, then load the user named by the subject
//! claim. No client-supplied identifier is ever trusted directly.

use anyhow::Result;

use crate::db::Db;
use crate::error::AppError;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::{token_fingerprint, IssuedToken, TokenService};

/// A successful login: the signed token plus the email it names.
#[derive(Debug, Clone)]
pub struct Login {
    pub email: String,
    pub issued: IssuedToken,
}

/// Registration, login, and identity resolution.
#[derive(Clone)]
pub struct AccountService {
    db: Db,
    tokens: TokenService,
    /// Digest verified when login hits an unknown email, so both
    /// failure paths cost the same.
    dummy_digest: String,
}

impl AccountService {
    pub fn new(db: Db, tokens: TokenService) -> Result<Self> {
        let dummy_digest = hash_password("placeholder-for-unknown-accounts")?;
        Ok(Self {
            db,
            tokens,
            dummy_digest,
        })
    }

    /// Register a new account. Inputs are validated by the route layer;
    /// duplicate email or username reports `Conflict`.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("email already in use".to_string()));
        }
        if self.db.get_user_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("username already taken".to_string()));
        }

        let digest = hash_password(password).map_err(AppError::Internal)?;

        // The store's UNIQUE constraints decide any race that slipped
        // past the checks above.
        let user = self.db.create_user(email, username, &digest).await?;

        tracing::info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    /// Log in with email and password, issuing and recording a token.
    ///
    /// Unknown email and wrong password fail identically; only a store
    /// or signing failure surfaces as anything else.
    pub async fn login(&self, email: &str, password: &str) -> Result<Login, AppError> {
        let user = match self.db.get_user_by_email(email).await? {
            Some(user) => user,
            None => {
                let _ = verify_password(password, &self.dummy_digest);
                return Err(AppError::InvalidCredentials);
            }
        };

        let matches = verify_password(password, &user.password_hash).map_err(AppError::Internal)?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&user.email).map_err(AppError::Internal)?;

        self.db
            .create_token(
                &user.email,
                &token_fingerprint(&issued.token),
                issued.issued_at,
                issued.expires_at,
            )
            .await?;

        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(Login {
            email: user.email,
            issued,
        })
    }

    /// Resolve the user a request is acting as, from its signed token.
    pub async fn resolve_identity(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AppError::InvalidToken
        })?;

        self.db
            .get_user_by_email(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
