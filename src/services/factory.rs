// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Produces PocketBase client handles bound to the configured instance.

use crate::config::Config;
use crate::services::cookie::AUTH_COOKIE_NAME;
use crate::services::pocketbase::PocketBase;

/// Factory for per-request client handles.
///
/// The HTTP connection pool is shared; credentials are not.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    http: reqwest::Client,
    base_url: String,
    auth_collection: String,
}

impl ClientFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.pocketbase_url.clone(),
            auth_collection: config.auth_collection.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fresh handle with empty credentials.
    pub fn new_handle(&self) -> PocketBase {
        PocketBase::new(
            self.http.clone(),
            self.base_url.clone(),
            self.auth_collection.clone(),
        )
    }

    /// Fresh handle with credentials loaded from a `pb_auth` cookie value.
    /// An unparseable value yields empty credentials.
    pub fn handle_from_cookie(&self, value: &str) -> PocketBase {
        let mut pb = self.new_handle();
        pb.auth_store
            .load_from_cookie(&format!("{AUTH_COOKIE_NAME}={value}"));
        pb
    }
}
