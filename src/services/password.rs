// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing (Argon2id, PHC string format).
//!
//! Each digest carries its own random salt, so the same password never
//! hashes to the same string twice; comparison goes through
//! `verify_password` rather than digest equality.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password into a storable digest.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// The underlying comparison is constant-time; a malformed stored
/// digest is an error, not a mismatch.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|e| anyhow!("Invalid password digest: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let digest = hash_password("secret").unwrap();
        assert!(verify_password("secret", &digest).unwrap());
        assert!(!verify_password("wrong", &digest).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret", &first).unwrap());
        assert!(verify_password("secret", &second).unwrap());
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let digest = hash_password("hunter2").unwrap();
        assert!(!digest.contains("hunter2"));
        assert!(digest.starts_with("$argon2"));
    }

    #[test]
    fn test_malformed_digest_is_error() {
        assert!(verify_password("secret", "not-a-digest").is_err());
    }
}
