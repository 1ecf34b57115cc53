// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Clients only ever see an opaque `{"error": "..."}` body; the underlying
//! cause is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::cookie::CookieExportError;

/// Message returned for any failure while persisting a session.
pub const SAVE_AUTH_FAILED: &str = "Failed to save authentication";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid login payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Cookie export rejected: {0}")]
    CookieExport(#[from] CookieExportError),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Login API error");

        let body = ErrorResponse {
            error: SAVE_AUTH_FAILED.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
