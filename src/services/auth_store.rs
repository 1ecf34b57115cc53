// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store carried by a PocketBase client handle.
//!
//! Mirrors the provider SDK's auth store: a token plus the auth record, a
//! local-only validity check, and a portable cookie export/import format.
//! The token is never verified here; only its unverified payload is read.

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

use crate::models::RawRecord;
use crate::services::cookie::AUTH_COOKIE_NAME;

/// Browsers drop cookies larger than this.
const MAX_COOKIE_SIZE: usize = 4096;

/// Record fields kept when an export has to be shrunk.
const ESSENTIAL_RECORD_FIELDS: [&str; 5] = ["id", "email", "collectionId", "collectionName", "verified"];

/// What the `exp` claim of a token payload says about its lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenExpiry {
    /// Missing or falsy: the token does not expire locally.
    Never,
    /// Seconds since the epoch, possibly fractional.
    At(f64),
    /// Present but not a number.
    Unreadable,
}

/// Serialized form of the store inside the cookie value.
#[derive(Debug, Deserialize)]
struct ExportedAuth {
    #[serde(default)]
    token: String,
    #[serde(default)]
    record: Option<RawRecord>,
    /// Older SDKs exported the record under this name.
    #[serde(default)]
    model: Option<RawRecord>,
}

/// Token and auth record held by one client handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthStore {
    token: String,
    record: Option<RawRecord>,
}

impl AuthStore {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn record(&self) -> Option<&RawRecord> {
        self.record.as_ref()
    }

    /// Replace the stored credentials. No verification is performed.
    pub fn save(&mut self, token: impl Into<String>, record: Option<RawRecord>) {
        self.token = token.into();
        self.record = record;
    }

    pub fn clear(&mut self) {
        self.token.clear();
        self.record = None;
    }

    /// Local check only: the token payload decodes to a non-empty object and
    /// its `exp`, when set, lies in the future. A revoked token still passes.
    pub fn is_valid(&self) -> bool {
        let payload = token_payload(&self.token);
        if payload.is_empty() {
            return false;
        }

        match expiry_claim(&payload) {
            TokenExpiry::Never => true,
            TokenExpiry::At(exp) => exp > now_secs(),
            TokenExpiry::Unreadable => false,
        }
    }

    /// Export the store as a `Set-Cookie` style string:
    /// `pb_auth=<uri-encoded json>; HttpOnly; SameSite=Strict; Secure; Path=/; Expires=...`.
    ///
    /// Expires follows the token's `exp` (the epoch when unknown). When the
    /// result would exceed the browser cookie limit the record is reduced to
    /// its essential fields.
    pub fn export_to_cookie(&self) -> String {
        let expires = token_expiry(&self.token)
            .filter(|exp| exp.is_finite())
            .and_then(|exp| OffsetDateTime::from_unix_timestamp(exp.floor() as i64).ok())
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);

        let exported = serialize_export(&self.token, self.record.as_ref(), expires);
        if exported.len() <= MAX_COOKIE_SIZE {
            return exported;
        }

        let Some(record) = &self.record else {
            return exported;
        };
        let reduced: RawRecord = record
            .iter()
            .filter(|(key, _)| ESSENTIAL_RECORD_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        tracing::debug!(
            size = exported.len(),
            "Auth cookie export too large, keeping essential record fields only"
        );
        serialize_export(&self.token, Some(&reduced), expires)
    }

    /// Load credentials from a cookie string containing `pb_auth=<value>`.
    ///
    /// Anything unparseable leaves the store empty.
    pub fn load_from_cookie(&mut self, cookie: &str) {
        let exported = find_cookie_value(cookie, AUTH_COOKIE_NAME)
            .and_then(|raw| urlencoding::decode(raw).ok())
            .and_then(|json| serde_json::from_str::<ExportedAuth>(&json).ok());

        match exported {
            Some(data) => self.save(data.token, data.record.or(data.model)),
            None => self.clear(),
        }
    }
}

/// Read the `exp` claim from a token without verifying its signature.
pub fn token_expiry(token: &str) -> Option<f64> {
    match expiry_claim(&token_payload(token)) {
        TokenExpiry::At(exp) => Some(exp),
        TokenExpiry::Never | TokenExpiry::Unreadable => None,
    }
}

/// Unverified JSON payload of a JWT-shaped token, empty when unreadable.
fn token_payload(token: &str) -> RawRecord {
    token
        .split('.')
        .nth(1)
        .map(|part| part.trim_end_matches('=').replace('+', "-").replace('/', "_"))
        .and_then(|part| URL_SAFE_NO_PAD.decode(part).ok())
        .and_then(|bytes| serde_json::from_slice::<RawRecord>(&bytes).ok())
        .unwrap_or_default()
}

/// Interpret `exp` with the provider SDK's loose numeric rules: falsy values
/// mean no expiry and numeric strings count as numbers.
fn expiry_claim(payload: &RawRecord) -> TokenExpiry {
    match payload.get("exp") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => TokenExpiry::Never,
        Some(Value::Bool(true)) => TokenExpiry::At(1.0),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(exp) if exp == 0.0 => TokenExpiry::Never,
            Some(exp) => TokenExpiry::At(exp),
            None => TokenExpiry::Unreadable,
        },
        Some(Value::String(s)) if s.is_empty() => TokenExpiry::Never,
        Some(Value::String(s)) => match s.trim() {
            "" => TokenExpiry::At(0.0),
            trimmed => trimmed
                .parse::<f64>()
                .ok()
                .filter(|exp| !exp.is_nan())
                .map_or(TokenExpiry::Unreadable, TokenExpiry::At),
        },
        Some(_) => TokenExpiry::Unreadable,
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(f64::MAX)
}

fn serialize_export(token: &str, record: Option<&RawRecord>, expires: OffsetDateTime) -> String {
    let raw = serde_json::json!({
        "token": token,
        "record": record,
    });

    Cookie::build((AUTH_COOKIE_NAME, urlencoding::encode(&raw.to_string()).into_owned()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .expires(expires)
        .build()
        .to_string()
}

/// Find `name=value` in a `;`-separated cookie string.
fn find_cookie_value<'a>(cookie: &'a str, name: &str) -> Option<&'a str> {
    cookie.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}
