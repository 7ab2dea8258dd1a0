// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request identity resolution middleware.
//!
//! Identity comes only from the signed session token: cookie first,
//! then `Authorization: Bearer`. The token's signature and expiry are
//! verified and the subject claim is resolved to a stored user before
//! any protected handler runs.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "blog_token";

/// Authenticated user resolved from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let user = state.accounts.resolve_identity(&token).await?;

    let auth_user = AuthUser {
        id: user.id,
        email: user.email,
        username: user.username,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
