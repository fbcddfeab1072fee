// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloudinary image store client.
//!
//! Uses the signed REST upload API:
//! - `POST /v1_1/{cloud}/image/upload` with the profile transform
//! - `POST /v1_1/{cloud}/image/destroy` to remove an asset
//!
//! Requests are signed with SHA-256 over the sorted parameters plus the API
//! secret.

use crate::config::CloudinaryConfig;
use crate::error::AppError;
use crate::services::asset_store::{
    AssetStore, AssetStoreError, DeleteOutcome, UploadRequest, UploadedAsset,
};
use futures_util::future::BoxFuture;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Cloudinary API client.
#[derive(Clone)]
pub struct CloudinaryStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStore {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(config: &CloudinaryConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("https://api.cloudinary.com/v1_1/{}", config.cloud_name),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    async fn upload_asset(&self, request: UploadRequest) -> Result<UploadedAsset, AssetStoreError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("timestamp", timestamp.as_str()),
                ("transformation", request.transformation),
            ],
            &self.api_secret,
        );

        let file = reqwest::multipart::Part::bytes(request.data).file_name(request.file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("transformation", request.transformation)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(format!("{}/image/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body: UploadResponse = check_response_json(response).await?;
        tracing::info!(public_id = %body.public_id, "Uploaded image to Cloudinary");

        Ok(UploadedAsset {
            public_id: body.public_id,
            url: body.secure_url,
        })
    }

    async fn destroy_asset(&self, public_id: &str) -> Result<DeleteOutcome, AssetStoreError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let response = self
            .http
            .post(format!("{}/image/destroy", self.base_url))
            .form(&[
                ("public_id", public_id),
                ("api_key", self.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let body: DestroyResponse = check_response_json(response).await?;
        parse_destroy_result(&body.result)
    }
}

impl AssetStore for CloudinaryStore {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, Result<UploadedAsset, AssetStoreError>> {
        Box::pin(self.upload_asset(request))
    }

    fn delete<'a>(
        &'a self,
        public_id: &'a str,
    ) -> BoxFuture<'a, Result<DeleteOutcome, AssetStoreError>> {
        Box::pin(self.destroy_asset(public_id))
    }
}

/// Upload response (only the fields we keep).
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Interpret the `result` field of a destroy call.
///
/// Only `"ok"` and `"not found"` count as success; any other status is an
/// error so the local record is kept.
fn parse_destroy_result(result: &str) -> Result<DeleteOutcome, AssetStoreError> {
    match result {
        "ok" => Ok(DeleteOutcome::Deleted),
        "not found" => Ok(DeleteOutcome::NotFound),
        other => Err(AssetStoreError::UnexpectedResult(other.to_string())),
    }
}

/// Cloudinary request signature: sort params by name, join as `k=v&k=v`,
/// append the secret, SHA-256, hex.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_transport_error(e: reqwest::Error) -> AssetStoreError {
    if e.is_timeout() {
        tracing::warn!("Cloudinary request timed out");
        AssetStoreError::Transport("timed out".to_string())
    } else {
        AssetStoreError::Transport(e.to_string())
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AssetStoreError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if status == 429 {
            tracing::warn!("Cloudinary rate limit hit (429)");
        }

        return Err(AssetStoreError::Rejected { status, body });
    }

    response
        .json()
        .await
        .map_err(|e| AssetStoreError::UnexpectedResult(format!("JSON parse error: {}", e)))
}
