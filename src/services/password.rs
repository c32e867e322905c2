// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with Argon2id.

use crate::error::AppError;
use crate::models::User;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password, returning the PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC hash.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        tracing::warn!("Stored password hash is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Outcome of checking a login password against an account.
#[derive(Debug, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Matched a plaintext password left by an older client; re-hash it
    ValidLegacy,
    Invalid,
}

/// Check `password` against whatever credential `user` carries.
pub fn check_user_password(user: &User, password: &str) -> PasswordCheck {
    use subtle::ConstantTimeEq;

    match (&user.password_hash, &user.password) {
        (Some(hash), _) => {
            if verify_password(password, hash) {
                PasswordCheck::Valid
            } else {
                PasswordCheck::Invalid
            }
        }
        (None, Some(plain)) if bool::from(plain.as_bytes().ct_eq(password.as_bytes())) => {
            PasswordCheck::ValidLegacy
        }
        _ => PasswordCheck::Invalid,
    }
}
