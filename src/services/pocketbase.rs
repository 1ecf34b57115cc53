// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PocketBase client handle.
//!
//! Only the auth endpoints of one auth collection are used:
//! - Password sign-in (browser session client)
//! - Auth refresh (session validation)

use crate::models::RawRecord;
use crate::services::auth_store::AuthStore;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

/// Errors from PocketBase API calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("PocketBase request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("PocketBase returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Successful auth response (`{token, record}`).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: RawRecord,
}

/// PocketBase error body.
#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Client handle bound to one PocketBase instance.
///
/// Each handle owns its own [`AuthStore`]. Server code creates one handle
/// per request so credentials never leak between requests.
#[derive(Debug, Clone)]
pub struct PocketBase {
    http: reqwest::Client,
    base_url: String,
    auth_collection: String,
    pub auth_store: AuthStore,
}

impl PocketBase {
    /// Create a handle with empty credentials. No network I/O.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        auth_collection: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth_collection: auth_collection.into(),
            auth_store: AuthStore::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Refresh the current token.
    ///
    /// POST {base}/api/collections/{collection}/auth-refresh
    /// Authorization: {token}
    ///
    /// On success the refreshed token and record replace the stored ones.
    pub async fn auth_refresh(&mut self) -> Result<AuthResponse, ProviderError> {
        let url = self.collection_url("auth-refresh");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_store.token())
            .send()
            .await?;

        let auth: AuthResponse = check_response_json(response).await?;
        self.auth_store
            .save(auth.token.clone(), Some(auth.record.clone()));
        Ok(auth)
    }

    /// Sign in with identity (email or username) and password.
    ///
    /// POST {base}/api/collections/{collection}/auth-with-password
    pub async fn auth_with_password(
        &mut self,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse, ProviderError> {
        let url = self.collection_url("auth-with-password");

        let body = serde_json::json!({
            "identity": identity,
            "password": password,
        });

        let response = self.http.post(&url).json(&body).send().await?;

        let auth: AuthResponse = check_response_json(response).await?;
        self.auth_store
            .save(auth.token.clone(), Some(auth.record.clone()));
        Ok(auth)
    }

    fn collection_url(&self, action: &str) -> String {
        format!(
            "{}/api/collections/{}/{}",
            self.base_url,
            urlencoding::encode(&self.auth_collection),
            action
        )
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    Err(ProviderError::Status {
        status: status.as_u16(),
        message,
    })
}
