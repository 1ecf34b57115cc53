// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser-side session client.
//!
//! Owns the one PocketBase handle of a browser session. It is built once at
//! session bootstrap and passed to whatever needs it; nothing global.
//!
//! Sign-in talks to PocketBase directly, then hands `{token, record}` to the
//! app's login endpoint so the server can set the auth cookie.

use reqwest::{redirect::Policy, StatusCode};
use serde::Serialize;

use crate::models::{IdentityRecord, RawRecord};
use crate::services::{is_well_formed, PocketBase, ProviderError};

/// Errors from the browser session client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("App request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("App returned HTTP {0}")]
    Status(u16),
}

#[derive(Serialize)]
struct LoginBody<'a> {
    token: &'a str,
    record: &'a RawRecord,
}

/// One browser session against the app and PocketBase.
pub struct SessionClient {
    http: reqwest::Client,
    app_url: String,
    pb: PocketBase,
}

impl SessionClient {
    /// `app_url` is the base URL of this server. Cookies set by the app are
    /// kept for the lifetime of the client; redirects are not followed.
    pub fn new(app_url: impl Into<String>, pb: PocketBase) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            http,
            app_url: app_url.into().trim_end_matches('/').to_string(),
            pb,
        })
    }

    pub fn handle(&self) -> &PocketBase {
        &self.pb
    }

    /// Local check of the handle's credentials.
    pub fn is_signed_in(&self) -> bool {
        is_well_formed(&self.pb)
    }

    /// Password sign-in followed by cookie persistence on the server.
    ///
    /// If the server refuses the session the handle is cleared again.
    pub async fn sign_in(&mut self, identity: &str, password: &str) -> Result<(), ClientError> {
        let auth = self.pb.auth_with_password(identity, password).await?;

        let body = LoginBody {
            token: &auth.token,
            record: &auth.record,
        };
        let result = self.post("/api/auth/login", Some(&body)).await;

        if result.is_err() {
            self.pb.auth_store.clear();
        }
        result
    }

    /// Clear local credentials, then ask the server to drop the cookie.
    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        self.pb.auth_store.clear();
        self.post::<()>("/api/auth/logout", None).await
    }

    /// Load the protected home page.
    ///
    /// Returns `None` when the app redirects to the login page.
    pub async fn current_identity(&self) -> Result<Option<IdentityRecord>, ClientError> {
        let response = self.http.get(format!("{}/", self.app_url)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            status if status.is_redirection() => Ok(None),
            status => Err(ClientError::Status(status.as_u16())),
        }
    }

    async fn post<T: Serialize>(&self, path: &str, body: Option<&T>) -> Result<(), ClientError> {
        let mut request = self.http.post(format!("{}{}", self.app_url, path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::warn!(path, status = %response.status(), "App rejected session request");
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
