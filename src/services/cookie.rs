// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie codec.
//!
//! Stores the value portion of the provider's cookie export under a single
//! httpOnly cookie. The value is kept verbatim: no local signing, encryption
//! or expiry computation.
//!
//! The export value is already percent-encoded, so the cookie is written and
//! read raw. Going through `CookieJar` would encode it a second time and the
//! header would no longer match the export (or its size limit).

use axum::{
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::convert::Infallible;
use time::Duration;

use crate::services::auth_store::AuthStore;

/// Name of the session cookie (also the provider's export key).
pub const AUTH_COOKIE_NAME: &str = "pb_auth";

/// Session cookie lifetime.
pub const AUTH_COOKIE_MAX_AGE: Duration = Duration::days(7);

/// Why a provider export could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieExportError {
    #[error("cookie export carries no session token")]
    NothingToPersist,

    #[error("cookie export is not of the form `pb_auth=value; ...`")]
    Malformed,
}

/// A session cookie to send as `Set-Cookie`, value emitted as-is.
#[derive(Debug, Clone)]
pub struct SetAuthCookie(Cookie<'static>);

impl SetAuthCookie {
    pub fn cookie(&self) -> &Cookie<'static> {
        &self.0
    }

    /// Header value exactly as sent to the browser.
    pub fn header_value(&self) -> String {
        self.0.to_string()
    }
}

impl IntoResponseParts for SetAuthCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        match HeaderValue::from_str(&self.header_value()) {
            Ok(value) => {
                res.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auth cookie is not a valid header value, dropping it");
            }
        }
        Ok(res)
    }
}

/// Extract the value portion of `pb_auth=value; attr...`.
pub fn export_value(export: &str) -> Result<&str, CookieExportError> {
    let rest = export
        .strip_prefix(AUTH_COOKIE_NAME)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or(CookieExportError::Malformed)?;

    let value = rest.split(';').next().unwrap_or_default();
    if value.is_empty() {
        return Err(CookieExportError::Malformed);
    }

    let mut store = AuthStore::default();
    store.load_from_cookie(export);
    if store.token().is_empty() {
        return Err(CookieExportError::NothingToPersist);
    }

    Ok(value)
}

/// Persist a provider export, replacing any previous session cookie.
pub fn write(export: &str, secure: bool) -> Result<SetAuthCookie, CookieExportError> {
    let value = export_value(export)?;
    Ok(SetAuthCookie(session_cookie(value.to_string(), secure)))
}

/// Current session cookie value from the request's `Cookie` headers,
/// without percent-decoding.
pub fn read(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header))
        .filter_map(Result::ok)
        .find(|c| c.name() == AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Delete the session cookie. Always emits a removal cookie.
pub fn clear(secure: bool) -> SetAuthCookie {
    SetAuthCookie(removal_cookie(secure))
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(AUTH_COOKIE_MAX_AGE)
        .build()
}

/// Attributes must match `session_cookie` for browsers to drop it.
fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
