// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Social-Photos: member accounts and profile photos
//!
//! This crate provides the backend API for registering members, issuing
//! session tokens, and managing each member's photos (with exactly one main
//! photo) on top of an external image store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{AssetStore, CredentialService, PhotoService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub credentials: CredentialService,
    pub photos: PhotoService,
}

impl AppState {
    /// Wire services over a store and an image store backend.
    pub fn new(config: Config, store: Store, assets: Arc<dyn AssetStore>) -> Self {
        let credentials = CredentialService::new(store.clone());
        let photos = PhotoService::new(store.clone(), assets, config.asset_store_timeout);
        Self {
            config,
            store,
            credentials,
            photos,
        }
    }
}
