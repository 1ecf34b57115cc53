// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie endpoints.
//!
//! The browser signs in against PocketBase directly and hands the result to
//! `/api/auth/login`, which only persists it. The token is not re-checked
//! with the provider here.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::models::RawRecord;
use crate::services::cookie::{self, SetAuthCookie};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Body of a login request, as returned by PocketBase password auth.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    #[serde(default)]
    pub record: Option<RawRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Persist a freshly obtained session into the auth cookie.
///
/// The body is parsed by hand so that a malformed payload produces the same
/// opaque 500 as every other failure.
async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(SetAuthCookie, Json<SuccessResponse>)> {
    let payload: LoginPayload = serde_json::from_slice(&body)?;

    let mut pb = state.clients.new_handle();
    pb.auth_store.save(payload.token, payload.record);

    let set_cookie = cookie::write(&pb.auth_store.export_to_cookie(), state.config.production)?;

    tracing::info!("Session cookie saved");
    Ok((set_cookie, SuccessResponse::ok()))
}

/// Remove the auth cookie. Safe to call without a session.
async fn logout(State(state): State<Arc<AppState>>) -> (SetAuthCookie, Json<SuccessResponse>) {
    tracing::info!("Session cookie cleared");
    (cookie::clear(state.config.production), SuccessResponse::ok())
}
