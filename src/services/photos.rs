// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo lifecycle: upload, set-main, delete.
//!
//! Coordinates the image store with the per-user photo collection:
//! - A photo record is created only after the upload succeeded
//! - On delete the remote asset goes first; the local record is removed only
//!   once the store confirms (or reports the asset already gone)
//! - The remote delete runs outside the user's photo lock; the photo is
//!   marked pending so no concurrent set-main can promote it meanwhile

use crate::db::Store;
use crate::error::AppError;
use crate::models::Photo;
use crate::pagination::{PageParams, Paginated};
use crate::services::asset_store::{
    with_timeout, AssetStore, AssetStoreError, DeleteOutcome, UploadRequest,
    PROFILE_TRANSFORMATION,
};
use std::sync::Arc;
use std::time::Duration;

/// Photo operations for authenticated owners.
#[derive(Clone)]
pub struct PhotoService {
    store: Store,
    assets: Arc<dyn AssetStore>,
    timeout: Duration,
}

impl PhotoService {
    pub fn new(store: Store, assets: Arc<dyn AssetStore>, timeout: Duration) -> Self {
        Self {
            store,
            assets,
            timeout,
        }
    }

    /// Upload bytes to the image store and record the photo.
    pub async fn upload_photo(
        &self,
        user_id: u64,
        file_name: String,
        data: Vec<u8>,
        description: Option<String>,
    ) -> Result<Photo, AppError> {
        if data.is_empty() {
            return Err(AppError::InvalidArgument("File is empty".to_string()));
        }

        // Fail fast for unknown users before spending an upload.
        if self.store.get_user(user_id).is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let size = data.len();
        let request = UploadRequest {
            file_name,
            data,
            transformation: PROFILE_TRANSFORMATION,
        };

        let asset = with_timeout(self.timeout, self.assets.upload(request))
            .await
            .map_err(|e| {
                tracing::warn!(user_id, error = %e, "Image upload failed");
                AppError::UploadFailed(e.to_string())
            })?;

        let photo = self.store.add_photo(user_id, asset, description).await?;

        tracing::info!(
            user_id,
            photo_id = photo.id,
            bytes = size,
            is_main = photo.is_main,
            "Photo added"
        );
        Ok(photo)
    }

    pub async fn set_main_photo(&self, user_id: u64, photo_id: u64) -> Result<(), AppError> {
        self.store.set_main_photo(user_id, photo_id).await?;
        tracing::info!(user_id, photo_id, "Main photo changed");
        Ok(())
    }

    /// Delete a non-main photo, removing its image store asset first.
    pub async fn delete_photo(&self, user_id: u64, photo_id: u64) -> Result<(), AppError> {
        let (public_id, _pending) = {
            let collection = self.store.lock_photos(user_id).await?;
            let public_id = collection.ensure_deletable(photo_id)?.public_id.clone();
            (public_id, collection.begin_delete(photo_id)?)
        };

        if let Some(public_id) = public_id {
            let outcome = with_timeout(self.timeout, self.assets.delete(&public_id))
                .await
                .map_err(|e: AssetStoreError| {
                    tracing::warn!(
                        user_id,
                        photo_id,
                        public_id = %public_id,
                        error = %e,
                        "Image store delete failed, keeping photo"
                    );
                    AppError::from(e)
                })?;

            if outcome == DeleteOutcome::NotFound {
                tracing::info!(
                    photo_id,
                    public_id = %public_id,
                    "Image already absent from store"
                );
            }
        }

        self.store.lock_photos(user_id).await?.remove(photo_id)?;
        tracing::info!(user_id, photo_id, "Photo deleted");
        Ok(())
    }

    pub async fn get_photo(&self, photo_id: u64) -> Result<Photo, AppError> {
        self.store.get_photo(photo_id).await
    }

    pub async fn get_main_photo(&self, user_id: u64) -> Result<Photo, AppError> {
        self.store.get_main_photo(user_id).await
    }

    /// One page of a user's photos in upload order.
    pub async fn list_photos(
        &self,
        user_id: u64,
        params: &PageParams,
    ) -> Result<Paginated<Photo>, AppError> {
        let photos = self.store.lock_photos(user_id).await?.photos().to_vec();
        Paginated::from_items(photos, params)
    }
}
