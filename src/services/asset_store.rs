// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External image store abstraction.
//!
//! The store holds the binary image data and applies the profile transform;
//! we only keep its asset ID and URL. Two implementations exist:
//! - [`CloudinaryStore`](crate::services::cloudinary::CloudinaryStore) for production
//! - [`InMemoryAssetStore`] for local development and tests

use crate::error::AppError;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Fixed transform applied to every upload: 500x500 square crop centred on
/// the detected face.
pub const PROFILE_TRANSFORMATION: &str = "w_500,h_500,c_fill,g_face";

/// Bytes to upload plus the client-supplied file name.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub data: Vec<u8>,
    pub transformation: &'static str,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub url: String,
}

/// Result of a delete that the caller may treat as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The store had no such asset. Deletion is idempotent, so callers
    /// proceed as if it had been deleted.
    NotFound,
}

/// Failures talking to the image store.
#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

impl From<AssetStoreError> for AppError {
    fn from(err: AssetStoreError) -> Self {
        AppError::AssetStore(err.to_string())
    }
}

/// Image store operations. Object-safe so `AppState` can hold any backend.
pub trait AssetStore: Send + Sync {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, Result<UploadedAsset, AssetStoreError>>;

    fn delete<'a>(
        &'a self,
        public_id: &'a str,
    ) -> BoxFuture<'a, Result<DeleteOutcome, AssetStoreError>>;
}

/// Bound an image store call so a hung remote never hangs the request.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, AssetStoreError>
where
    F: Future<Output = Result<T, AssetStoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AssetStoreError::Timeout(limit))?
}

/// In-process image store.
///
/// Keeps uploaded bytes in memory and serves `memory://` URLs. Failure and
/// latency knobs let tests exercise the error paths.
#[derive(Default)]
pub struct InMemoryAssetStore {
    assets: DashMap<String, Vec<u8>>,
    next_id: AtomicU64,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.assets.contains_key(public_id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl AssetStore for InMemoryAssetStore {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, Result<UploadedAsset, AssetStoreError>> {
        Box::pin(async move {
            self.simulate_latency().await;

            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(AssetStoreError::Rejected {
                    status: 500,
                    body: "simulated upload failure".to_string(),
                });
            }

            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let public_id = format!("photo_{}", n);
            let url = format!("memory://assets/{}/{}", request.transformation, public_id);
            self.assets.insert(public_id.clone(), request.data);

            Ok(UploadedAsset { public_id, url })
        })
    }

    fn delete<'a>(
        &'a self,
        public_id: &'a str,
    ) -> BoxFuture<'a, Result<DeleteOutcome, AssetStoreError>> {
        Box::pin(async move {
            self.simulate_latency().await;

            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(AssetStoreError::Rejected {
                    status: 500,
                    body: "simulated delete failure".to_string(),
                });
            }

            Ok(match self.assets.remove(public_id) {
                Some(_) => DeleteOutcome::Deleted,
                None => DeleteOutcome::NotFound,
            })
        })
    }
}
