// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Header carrying the human-readable failure message on every error response.
pub const APPLICATION_ERROR_HEADER: &str = "Application-Error";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not the owner of this resource")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image store failure while uploading. The client sent something the
    /// store could not take, so this surfaces as a 400.
    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// Image store failure on any other call (delete).
    #[error("Image store error: {0}")]
    AssetStore(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable kind used in the JSON body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DuplicateUser(_) => "duplicate_user",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::UploadFailed(_) | AppError::AssetStore(_) => "asset_store_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser(_)
            | AppError::InvalidState(_)
            | AppError::InvalidArgument(_)
            | AppError::UploadFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::Forbidden => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AssetStore(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            AppError::DuplicateUser(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidState(msg)
            | AppError::InvalidArgument(msg) => Some(msg.clone()),
            AppError::Unauthenticated | AppError::Forbidden => None,
            // Remote store messages stay in the logs.
            AppError::UploadFailed(msg) | AppError::AssetStore(msg) => {
                tracing::warn!(error = %msg, "Image store error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
        };

        let message = match &self {
            AppError::UploadFailed(_) => "Image upload failed".to_string(),
            AppError::AssetStore(_) => "Image store unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&message) {
            let headers = response.headers_mut();
            headers.insert(APPLICATION_ERROR_HEADER, value);
            headers.insert(
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                HeaderValue::from_static(APPLICATION_ERROR_HEADER),
            );
        }
        response
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
