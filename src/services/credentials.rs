// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store: registration and password login.
//!
//! Passwords are hashed with HMAC-SHA512 keyed by a per-user random salt.

use crate::db::{NewUser, Store};
use crate::error::AppError;
use crate::models::user::{normalize_username, User};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Salt length in bytes (one SHA-512 block).
pub const SALT_LEN: usize = 128;

/// Salt used to hash the attempted password for unknown usernames, so a
/// failed login costs the same whether or not the user exists.
const DUMMY_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

/// Username length bounds, in characters after normalization.
pub const MIN_USERNAME_LEN: usize = 1;
pub const MAX_USERNAME_LEN: usize = 32;

/// Generate a random salt from the system CSPRNG.
pub fn generate_salt() -> Result<Vec<u8>, AppError> {
    let mut salt = vec![0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(salt)
}

/// Derive the password hash for `password` under `salt`.
pub fn hash_password(password: &str, salt: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha512::new_from_slice(salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(password.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time check of `password` against a stored hash.
pub fn verify_password(password: &str, stored_hash: &[u8], salt: &[u8]) -> Result<bool, AppError> {
    let computed = hash_password(password, salt)?;
    Ok(computed.ct_eq(stored_hash).into())
}

/// Registration and login over the user store.
#[derive(Clone)]
pub struct CredentialService {
    store: Store,
}

impl CredentialService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a user. Usernames are unique case-insensitively.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = normalize_username(username);
        let len = username.chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
            return Err(AppError::InvalidArgument(format!(
                "Username must be {}-{} characters",
                MIN_USERNAME_LEN, MAX_USERNAME_LEN
            )));
        }

        if self.store.user_exists(&username) {
            return Err(AppError::DuplicateUser(username));
        }

        let salt = generate_salt()?;
        let hash = hash_password(password, &salt)?;

        // insert_user re-checks uniqueness atomically; the early check above
        // only skips the hashing work.
        let user = self.store.insert_user(NewUser {
            username,
            password_hash: hash,
            password_salt: salt,
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check credentials. Returns `None` for an unknown user or a wrong
    /// password without saying which.
    pub fn login(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let username = normalize_username(username);

        let Some(user) = self.store.get_user_by_username(&username) else {
            hash_password(password, &DUMMY_SALT)?;
            tracing::debug!("Login failed");
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash, &user.password_salt)? {
            tracing::debug!("Login failed");
            return Ok(None);
        }

        self.store.touch_user(user.id);
        tracing::info!(user_id = user.id, "User logged in");
        Ok(Some(user))
    }
}
