// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuance and verification (RS256 JWT).
//!
//! The private key stays inside this service; everything else verifies
//! with the public key. Expiry is always `issued_at + TTL` and is
//! checked with zero leeway at verification time.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the user's email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// A freshly issued token with its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Build the service from configured PEM key material.
    pub fn from_config(config: &Config) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.jwt_private_key.as_bytes())
            .context("Invalid JWT private key")?;
        let decoding_key = DecodingKey::from_rsa_pem(config.jwt_public_key.as_bytes())
            .context("Invalid JWT public key")?;

        Ok(Self {
            encoding_key,
            decoding_key,
            ttl: Duration::seconds(config.token_ttl_secs),
        })
    }

    /// Issue a signed token for the given subject.
    pub fn issue(&self, email: &str) -> Result<IssuedToken> {
        self.issue_at(email, Utc::now())
    }

    fn issue_at(&self, email: &str, issued_at: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .context("Failed to sign token")?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid or expired token")?;
        Ok(data.claims)
    }
}

/// SHA-256 hex fingerprint of a signed token, for the audit record.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::from_config(&Config::test_default()).expect("test keys")
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let issued = tokens.issue("a@x.com").unwrap();

        let claims = tokens.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expiry_is_issuance_plus_ttl() {
        let tokens = service();
        let issued = tokens.issue("a@x.com").unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, Duration::seconds(3600));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service();
        let stale = tokens
            .issue_at("a@x.com", Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(tokens.verify(&stale.token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = service();
        let issued = tokens.issue("a@x.com").unwrap();

        // Flip the last signature character.
        let mut tampered = issued.token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(tokens.verify(&tampered).is_err());
    }

    #[test]
    fn test_fingerprint_determinism() {
        let token = "header.payload.signature";
        assert_eq!(token_fingerprint(token), token_fingerprint(token));
        assert_ne!(token_fingerprint(token), token_fingerprint("other"));
        assert_eq!(token_fingerprint(token).len(), 64);
    }
}
