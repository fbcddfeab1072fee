//! User model for storage and API.

use chrono::{DateTime, Utc};

/// A registered member.
///
/// Credentials never leave the store layer in API responses; see
/// `routes::auth::UserSummary` for the public shape.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    /// Always lowercase
    pub username: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful login
    pub last_active: DateTime<Utc>,
}

/// Lowercase a username the same way on registration and login.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
