// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod asset_store;
pub mod cloudinary;
pub mod credentials;
pub mod photos;

pub use asset_store::{AssetStore, InMemoryAssetStore};
pub use cloudinary::CloudinaryStore;
pub use credentials::CredentialService;
pub use photos::PhotoService;
