// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request gate: redirects unauthenticated page requests to the login page.
//!
//! Only the local validity check runs here; the remote refresh happens when
//! a page asks for the current user.

use crate::services::{cookie, is_well_formed, ClientFactory};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Where unauthenticated requests are sent.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Pages reachable without a session (exact match).
pub const PUBLIC_ROUTES: [&str; 2] = [LOGIN_ROUTE, "/auth/register"];

/// Path prefixes the gate never looks at.
pub const EXCLUDED_PREFIXES: [&str; 3] = ["/api", "/static", "/favicon.ico"];

/// Outcome of classifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// API routes and static assets
    Excluded,
    PublicAllowed,
    NoCookie,
    CookiePresentInvalid,
    CookiePresentValid,
}

impl GateState {
    /// Whether the request passes through unchanged.
    pub fn allows(self) -> bool {
        matches!(
            self,
            GateState::Excluded | GateState::PublicAllowed | GateState::CookiePresentValid
        )
    }
}

/// Classify a request path and its session cookie value. No network I/O.
pub fn classify(path: &str, cookie: Option<&str>, factory: &ClientFactory) -> GateState {
    if EXCLUDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return GateState::Excluded;
    }

    if PUBLIC_ROUTES.contains(&path) {
        return GateState::PublicAllowed;
    }

    let Some(value) = cookie else {
        return GateState::NoCookie;
    };

    let pb = factory.handle_from_cookie(value);
    if is_well_formed(&pb) {
        GateState::CookiePresentValid
    } else {
        GateState::CookiePresentInvalid
    }
}

/// Login URL for a rejected request, keeping its query string.
fn login_redirect_target(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{LOGIN_ROUTE}?{query}"),
        None => LOGIN_ROUTE.to_string(),
    }
}

/// Middleware that gates every non-excluded, non-public path on a
/// locally valid session cookie.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let session = cookie::read(request.headers());
    let gate = classify(request.uri().path(), session.as_deref(), &state.clients);

    if gate.allows() {
        return next.run(request).await;
    }

    tracing::debug!(
        path = %request.uri().path(),
        gate = ?gate,
        "Redirecting unauthenticated request to login"
    );

    Redirect::temporary(&login_redirect_target(request.uri())).into_response()
}
