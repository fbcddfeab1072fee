// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuing and verification (HS512 JWT).

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cookie the session token may also be carried in.
pub const SESSION_COOKIE: &str = "session_token";

/// Session lifetime.
pub const TOKEN_LIFETIME_SECS: usize = 24 * 60 * 60;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// JWT claims structure.
///
/// Claim names match what the SPA client reads (`decodedToken.nameid`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub nameid: String,
    /// Username
    pub unique_name: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: u64,
    pub username: String,
}

impl AuthenticatedIdentity {
    /// Require that the route's `user_id` is the caller.
    pub fn ensure_owner(&self, user_id: u64) -> Result<(), AppError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            tracing::warn!(
                caller = self.user_id,
                target = user_id,
                "Rejected request for another user's resources"
            );
            Err(AppError::Forbidden)
        }
    }
}

/// Create a session token for `user`, valid for 24 hours.
pub fn issue_token(user: &User, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        nameid: user.id.to_string(),
        unique_name: user.username.clone(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    Ok(encode(
        &Header::new(TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Check signature and expiry and return the identity the token asserts.
pub fn verify_token(token: &str, signing_key: &[u8]) -> Result<AuthenticatedIdentity, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.leeway = 0;

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::Unauthenticated)?;

    let user_id: u64 = token_data
        .claims
        .nameid
        .parse()
        .map_err(|_| AppError::Unauthenticated)?;

    Ok(AuthenticatedIdentity {
        user_id,
        username: token_data.claims.unique_name,
    })
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try header first, then cookie
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        // Scheme names are case-insensitive
        Some(h) => match h.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthenticated),
        },
        None => jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(AppError::Unauthenticated)?,
    };

    let identity = verify_token(&token, &state.config.token_signing_key)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
