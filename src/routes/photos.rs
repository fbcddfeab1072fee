// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo routes, nested under the owning user.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthenticatedIdentity;
use crate::models::Photo;
use crate::pagination::{PageParams, Paginated};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Photo routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/{user_id}/photos",
            get(list_photos)
                .post(upload_photo)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/users/{user_id}/photos/main", get(get_main_photo))
        .route(
            "/api/users/{user_id}/photos/{id}",
            get(get_photo).delete(delete_photo),
        )
        .route(
            "/api/users/{user_id}/photos/{id}/setMain",
            post(set_main_photo),
        )
}

/// Photo as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PhotoResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub url: String,
    pub description: Option<String>,
    pub date_added: String,
    pub is_main: bool,
}

impl From<&Photo> for PhotoResponse {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            url: photo.url.clone(),
            description: photo.description.clone(),
            date_added: format_utc_rfc3339(photo.date_added),
            is_main: photo.is_main,
        }
    }
}

#[derive(Deserialize)]
struct PhotoPath {
    user_id: u64,
    id: u64,
}

// ─── Upload ──────────────────────────────────────────────────

/// Upload a photo (multipart: `file`, optional `description`).
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(user_id): Path<u64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    identity.ensure_owner(user_id)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidArgument(format!("Malformed upload: {}", e)))?;
                file = Some((file_name, data.to_vec()));
            }
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidArgument(format!("Malformed upload: {}", e)))?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::InvalidArgument("Missing 'file' field".to_string()))?;

    let photo = state
        .photos
        .upload_photo(user_id, file_name, data, description)
        .await?;

    let location = format!("/api/users/{}/photos/{}", user_id, photo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PhotoResponse::from(&photo)),
    ))
}

// ─── Reads ───────────────────────────────────────────────────

async fn get_photo(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PhotoPath>,
) -> Result<Json<PhotoResponse>> {
    let photo = state.photos.get_photo(path.id).await?;
    if photo.user_id != path.user_id {
        return Err(AppError::NotFound(format!("Photo {} not found", path.id)));
    }
    Ok(Json(PhotoResponse::from(&photo)))
}

async fn get_main_photo(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<PhotoResponse>> {
    let photo = state.photos.get_main_photo(user_id).await?;
    Ok(Json(PhotoResponse::from(&photo)))
}

/// List a user's photos; paging counters go in the `Pagination` header.
async fn list_photos(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    Query(params): Query<PageParams>,
) -> Result<Paginated<PhotoResponse>> {
    tracing::debug!(
        user_id,
        page = params.page_number,
        page_size = params.page_size,
        "Listing photos"
    );

    let page = state.photos.list_photos(user_id, &params).await?;
    Ok(page.map(|p| PhotoResponse::from(&p)))
}

// ─── Mutations ───────────────────────────────────────────────

async fn set_main_photo(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(path): Path<PhotoPath>,
) -> Result<StatusCode> {
    identity.ensure_owner(path.user_id)?;
    state.photos.set_main_photo(path.user_id, path.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(path): Path<PhotoPath>,
) -> Result<StatusCode> {
    identity.ensure_owner(path.user_id)?;
    state.photos.delete_photo(path.user_id, path.id).await?;
    Ok(StatusCode::OK)
}
