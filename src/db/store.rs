// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process data store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (credentials, case-insensitive username uniqueness)
//! - Photos (per-user collections guarded by a per-user lock)
//!
//! Every mutation of a user's photos goes through a [`PhotoCollection`],
//! which holds that user's lock for its whole lifetime. The main-photo
//! invariant (exactly one main photo whenever the user has any) is enforced
//! there.
//!
//! Slow work that must not block readers (the remote image delete) runs
//! outside the lock behind a [`PendingDelete`] marker. A marked photo cannot
//! become main and cannot be deleted twice.

use crate::error::AppError;
use crate::models::{Photo, User};
use crate::services::asset_store::UploadedAsset;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-user photo collection behind its own async lock.
type PhotoSlot = Arc<Mutex<Vec<Photo>>>;

/// Shared, cloneable handle to the store.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    users: DashMap<u64, User>,
    /// Lowercase username -> user ID
    usernames: DashMap<String, u64>,
    photos: DashMap<u64, PhotoSlot>,
    /// Photo ID -> owning user ID
    photo_owners: DashMap<u64, u64>,
    /// Photos whose image store asset is being deleted
    pending_deletes: DashSet<u64>,
    next_user_id: AtomicU64,
    next_photo_id: AtomicU64,
}

/// Fields needed to create a user. The username must already be normalized.
pub struct NewUser {
    pub username: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Insert a user, failing with `DuplicateUser` if the username is taken.
    ///
    /// The uniqueness check and the insert happen under the same map entry
    /// lock, so two concurrent registrations of one name cannot both win.
    pub fn insert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        match self.inner.usernames.entry(new_user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateUser(new_user.username)),
            Entry::Vacant(slot) => {
                let id = self.inner.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
                let now = Utc::now();
                let user = User {
                    id,
                    username: new_user.username,
                    password_hash: new_user.password_hash,
                    password_salt: new_user.password_salt,
                    created_at: now,
                    last_active: now,
                };

                self.inner.users.insert(id, user.clone());
                self.inner
                    .photos
                    .insert(id, Arc::new(Mutex::new(Vec::new())));
                slot.insert(id);

                Ok(user)
            }
        }
    }

    /// Check whether a (normalized) username is registered.
    pub fn user_exists(&self, username: &str) -> bool {
        self.inner.usernames.contains_key(username)
    }

    pub fn get_user(&self, user_id: u64) -> Option<User> {
        self.inner.users.get(&user_id).map(|u| u.clone())
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        let id = *self.inner.usernames.get(username)?;
        self.get_user(id)
    }

    /// Record a successful login.
    pub fn touch_user(&self, user_id: u64) {
        if let Some(mut user) = self.inner.users.get_mut(&user_id) {
            user.last_active = Utc::now();
        }
    }

    /// All users ordered by ID.
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.users.iter().map(|u| u.clone()).collect();
        users.sort_by_key(|u| u.id);
        users
    }

    // ─── Photo Operations ────────────────────────────────────────

    /// Acquire the photo lock for `user_id`.
    ///
    /// Holding the returned collection serializes all other photo mutations
    /// for this user, including across `.await` points.
    pub async fn lock_photos(&self, user_id: u64) -> Result<PhotoCollection, AppError> {
        let slot = self
            .inner
            .photos
            .get(&user_id)
            .map(|s| s.clone())
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(PhotoCollection {
            user_id,
            photos: slot.lock_owned().await,
            store: self.inner.clone(),
        })
    }

    /// Look up a photo by ID, regardless of owner.
    pub async fn get_photo(&self, photo_id: u64) -> Result<Photo, AppError> {
        let owner = self
            .inner
            .photo_owners
            .get(&photo_id)
            .map(|o| *o)
            .ok_or_else(|| AppError::NotFound(format!("Photo {} not found", photo_id)))?;

        let collection = self.lock_photos(owner).await?;
        collection
            .find(photo_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Photo {} not found", photo_id)))
    }

    /// The user's main photo; `NotFound` if they have no photos.
    pub async fn get_main_photo(&self, user_id: u64) -> Result<Photo, AppError> {
        let collection = self.lock_photos(user_id).await?;
        collection
            .main()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} has no main photo", user_id)))
    }

    /// Add a freshly uploaded photo for `user_id`.
    pub async fn add_photo(
        &self,
        user_id: u64,
        asset: UploadedAsset,
        description: Option<String>,
    ) -> Result<Photo, AppError> {
        let mut collection = self.lock_photos(user_id).await?;
        Ok(collection.add(asset, description))
    }

    /// Make `photo_id` the user's main photo.
    pub async fn set_main_photo(&self, user_id: u64, photo_id: u64) -> Result<(), AppError> {
        let mut collection = self.lock_photos(user_id).await?;
        collection.set_main(photo_id)
    }
}

/// A user's photos, locked for exclusive access.
pub struct PhotoCollection {
    user_id: u64,
    photos: OwnedMutexGuard<Vec<Photo>>,
    store: Arc<Inner>,
}

impl PhotoCollection {
    /// Photos in upload order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn find(&self, photo_id: u64) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == photo_id)
    }

    /// Look up a photo this user owns; `Forbidden` otherwise.
    pub fn owned(&self, photo_id: u64) -> Result<&Photo, AppError> {
        self.find(photo_id).ok_or(AppError::Forbidden)
    }

    pub fn main(&self) -> Option<&Photo> {
        self.photos.iter().find(|p| p.is_main)
    }

    /// Append a photo. The first photo a user owns becomes main.
    pub fn add(&mut self, asset: UploadedAsset, description: Option<String>) -> Photo {
        let id = self.store.next_photo_id.fetch_add(1, Ordering::SeqCst) + 1;
        let photo = Photo {
            id,
            user_id: self.user_id,
            url: asset.url,
            public_id: Some(asset.public_id),
            description,
            date_added: Utc::now(),
            is_main: self.main().is_none(),
        };

        self.insert(photo.clone());
        photo
    }

    /// Append a photo that has no image store asset.
    pub fn add_unmanaged(&mut self, url: String, description: Option<String>) -> Photo {
        let id = self.store.next_photo_id.fetch_add(1, Ordering::SeqCst) + 1;
        let photo = Photo {
            id,
            user_id: self.user_id,
            url,
            public_id: None,
            description,
            date_added: Utc::now(),
            is_main: self.main().is_none(),
        };

        self.insert(photo.clone());
        photo
    }

    fn insert(&mut self, photo: Photo) {
        self.store.photo_owners.insert(photo.id, self.user_id);
        self.photos.push(photo);
        debug_assert!(self.invariant_holds());
    }

    /// Move the main flag to `photo_id`.
    ///
    /// Fails with `InvalidState` if it is already main. Both flags flip
    /// while the collection is locked, so no reader sees zero or two mains.
    pub fn set_main(&mut self, photo_id: u64) -> Result<(), AppError> {
        if self.owned(photo_id)?.is_main {
            return Err(AppError::InvalidState(
                "Already is the main photo".to_string(),
            ));
        }
        if self.store.pending_deletes.contains(&photo_id) {
            return Err(AppError::InvalidState(
                "Photo is being deleted".to_string(),
            ));
        }

        for photo in self.photos.iter_mut() {
            photo.is_main = photo.id == photo_id;
        }

        debug_assert!(self.invariant_holds());
        Ok(())
    }

    /// Check that `photo_id` is owned and may be deleted.
    pub fn ensure_deletable(&self, photo_id: u64) -> Result<&Photo, AppError> {
        let photo = self.owned(photo_id)?;
        if photo.is_main {
            return Err(AppError::InvalidState(
                "Main photo cannot be deleted".to_string(),
            ));
        }
        Ok(photo)
    }

    /// Mark a deletable photo as pending delete.
    ///
    /// The mark lasts until the returned guard is dropped, so the caller can
    /// release the lock while it talks to the image store.
    pub fn begin_delete(&self, photo_id: u64) -> Result<PendingDelete, AppError> {
        self.ensure_deletable(photo_id)?;
        if !self.store.pending_deletes.insert(photo_id) {
            return Err(AppError::InvalidState(
                "Photo is already being deleted".to_string(),
            ));
        }
        Ok(PendingDelete {
            store: self.store.clone(),
            photo_id,
        })
    }

    /// Remove a non-main photo from the collection.
    pub fn remove(&mut self, photo_id: u64) -> Result<Photo, AppError> {
        self.ensure_deletable(photo_id)?;

        let index = self
            .photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or(AppError::Forbidden)?;
        let photo = self.photos.remove(index);
        self.store.photo_owners.remove(&photo_id);

        debug_assert!(self.invariant_holds());
        Ok(photo)
    }

    /// Exactly one main photo if any exist, none otherwise.
    pub fn invariant_holds(&self) -> bool {
        let mains = self.photos.iter().filter(|p| p.is_main).count();
        if self.photos.is_empty() {
            mains == 0
        } else {
            mains == 1
        }
    }
}

/// A photo marked as being deleted. Dropping it clears the mark.
pub struct PendingDelete {
    store: Arc<Inner>,
    photo_id: u64,
}

impl Drop for PendingDelete {
    fn drop(&mut self) {
        self.store.pending_deletes.remove(&self.photo_id);
    }
}
