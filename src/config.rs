// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Default bound on a single image store call.
const DEFAULT_ASSET_STORE_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// HMAC key for session tokens (raw bytes)
    pub token_signing_key: Vec<u8>,
    /// Cloudinary credentials; `None` selects the in-memory image store.
    pub cloudinary: Option<CloudinaryConfig>,
    /// Upper bound on each image store request
    pub asset_store_timeout: Duration,
}

/// Credentials for the Cloudinary image store.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Config {
    /// Config for tests: fixed signing key, in-memory image store.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:4200".to_string(),
            port: 8080,
            token_signing_key: b"test_token_key_must_be_long_enough_for_hs512!!".to_vec(),
            cloudinary: None,
            asset_store_timeout: Duration::from_secs(2),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let token_signing_key = env::var("TOKEN_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("TOKEN_SIGNING_KEY"))?;
        if token_signing_key.len() < 32 {
            return Err(ConfigError::Invalid(
                "TOKEN_SIGNING_KEY",
                "must be at least 32 bytes".to_string(),
            ));
        }

        let cloudinary = match (
            env::var("CLOUDINARY_CLOUD_NAME"),
            env::var("CLOUDINARY_API_KEY"),
            env::var("CLOUDINARY_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Ok(api_secret)) => Some(CloudinaryConfig {
                cloud_name: cloud_name.trim().to_string(),
                api_key: api_key.trim().to_string(),
                api_secret: api_secret.trim().to_string(),
            }),
            _ => None,
        };

        let asset_store_timeout = match env::var("ASSET_STORE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid("ASSET_STORE_TIMEOUT_SECS", raw))?,
            Err(_) => Duration::from_secs(DEFAULT_ASSET_STORE_TIMEOUT_SECS),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            token_signing_key: token_signing_key.into_bytes(),
            cloudinary,
            asset_store_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("TOKEN_SIGNING_KEY", "test_token_key_must_be_long_enough!!");
        env::remove_var("CLOUDINARY_CLOUD_NAME");
        env::remove_var("ASSET_STORE_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(
            config.token_signing_key,
            b"test_token_key_must_be_long_enough!!".to_vec()
        );
        assert!(config.cloudinary.is_none());
        assert_eq!(config.asset_store_timeout, Duration::from_secs(10));
    }
}
