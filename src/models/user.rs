// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User identity as exposed to pages and API callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw auth record as returned by PocketBase.
///
/// Kept as an untyped JSON object so it can be exported back to the cookie
/// without losing fields.
pub type RawRecord = Map<String, Value>;

/// Normalized, read-only view of the provider's user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// PocketBase record ID
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Whether the email address has been verified
    #[serde(default)]
    pub verified: bool,
    /// Creation timestamp, provider format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp, provider format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl IdentityRecord {
    /// Normalize a raw record. Returns `None` when required fields are
    /// missing or have the wrong type.
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        // PocketBase sends "" for unset optional text fields
        let username = match record.get("username") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return None,
        };

        let mut trimmed = record.clone();
        trimmed.remove("username");

        let mut identity: IdentityRecord =
            serde_json::from_value(Value::Object(trimmed)).ok()?;
        if identity.id.is_empty() {
            return None;
        }
        identity.username = username;
        Some(identity)
    }
}
