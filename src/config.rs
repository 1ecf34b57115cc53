// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything here is fixed at startup and shared read-only across requests.

use std::env;

/// Default PocketBase address for local development.
pub const DEFAULT_POCKETBASE_URL: &str = "http://127.0.0.1:8090";

/// Auth collection used for refresh and password sign-in.
pub const DEFAULT_AUTH_COLLECTION: &str = "users";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the PocketBase instance (no trailing slash)
    pub pocketbase_url: String,
    /// Auth collection name
    pub auth_collection: String,
    /// Running in production (enables `Secure` cookies)
    pub production: bool,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let pocketbase_url = normalize_base_url(
            &env::var("POCKETBASE_URL").unwrap_or_else(|_| DEFAULT_POCKETBASE_URL.to_string()),
        )?;

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 3000,
        };

        Ok(Self {
            pocketbase_url,
            auth_collection: env::var("POCKETBASE_AUTH_COLLECTION")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_AUTH_COLLECTION.to_string()),
            production: env::var("APP_ENV")
                .map(|v| v.trim().eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            port,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            pocketbase_url: DEFAULT_POCKETBASE_URL.to_string(),
            auth_collection: DEFAULT_AUTH_COLLECTION.to_string(),
            production: false,
            port: 3000,
        }
    }
}

/// Validate the provider URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    url::Url::parse(trimmed).map_err(|_| ConfigError::Invalid("POCKETBASE_URL", raw.to_string()))?;
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
