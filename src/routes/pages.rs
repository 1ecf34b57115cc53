// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page handlers behind the request gate.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::middleware::gate::LOGIN_ROUTE;
use crate::services::{cookie, current_user};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route(LOGIN_ROUTE, get(login_page))
        .route("/auth/register", get(register_page))
}

/// Protected home page: the current identity, confirmed with PocketBase.
///
/// A rejected session has its cookie removed and is sent to the login page.
/// A refreshed token is written back so the cookie tracks the provider.
async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let secure = state.config.production;
    let (identity, pb) = current_user(&state.clients, &headers).await;

    let Some(identity) = identity else {
        tracing::debug!("Session rejected by PocketBase, redirecting to login");
        return (cookie::clear(secure), Redirect::temporary(LOGIN_ROUTE)).into_response();
    };

    match cookie::write(&pb.auth_store.export_to_cookie(), secure) {
        Ok(set_cookie) => (set_cookie, Json(identity)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not persist refreshed session");
            Json(identity).into_response()
        }
    }
}

async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

async fn register_page() -> Html<&'static str> {
    Html("<!doctype html><title>Register</title><h1>Create an account</h1>")
}
