// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{issue_token, SESSION_COOKIE};
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Registration request body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 32, message = "Username must be 1-32 characters"))]
    pub username: String,
    #[validate(length(min = 4, max = 64, message = "Password must be 4-64 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub username: String,
    pub photo_url: Option<String>,
    pub created: String,
    pub last_active: String,
}

impl UserSummary {
    pub fn new(user: &User, photo_url: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            photo_url,
            created: format_utc_rfc3339(user.created_at),
            last_active: format_utc_rfc3339(user.last_active),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Create an account.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>)> {
    body.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let user = state.credentials.register(&body.username, &body.password)?;

    Ok((StatusCode::CREATED, Json(UserSummary::new(&user, None))))
}

/// Exchange credentials for a session token.
///
/// The token is returned in the body and also set as an HTTP-only cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = state
        .credentials
        .login(&body.username, &body.password)?
        .ok_or(AppError::Unauthenticated)?;

    let token = issue_token(&user, &state.config.token_signing_key)?;
    let photo_url = state.store.get_main_photo(user.id).await.ok().map(|p| p.url);

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user: UserSummary::new(&user, photo_url),
        }),
    ))
}

/// Clear the session cookie. Tokens are stateless, so a bearer token stays
/// valid until it expires.
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}
