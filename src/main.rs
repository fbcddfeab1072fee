// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social-Photos API Server
//!
//! Member accounts, session tokens, and profile photos backed by an external
//! image store.

use social_photos::{
    config::Config,
    db::Store,
    services::{AssetStore, CloudinaryStore, InMemoryAssetStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Social-Photos API");

    // Pick the image store backend
    let assets: Arc<dyn AssetStore> = match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!(cloud = %cloudinary.cloud_name, "Using Cloudinary image store");
            Arc::new(CloudinaryStore::new(cloudinary, config.asset_store_timeout)?)
        }
        None => {
            tracing::warn!("Cloudinary not configured, using in-memory image store");
            Arc::new(InMemoryAssetStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), Store::new(), assets));

    // Build router
    let app = social_photos::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("social_photos=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
