// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session validation.
//!
//! Two depths of check are kept separate on purpose:
//! - [`is_well_formed`]: local only, used by the request gate
//! - [`refresh_and_validate`]: remote round trip, used by pages
//!
//! A token that is well-formed but revoked passes the first and fails the
//! second.

use axum::http::HeaderMap;

use crate::models::IdentityRecord;
use crate::services::cookie;
use crate::services::factory::ClientFactory;
use crate::services::pocketbase::PocketBase;

/// Local validity check: token present, decodable and unexpired.
pub fn is_well_formed(pb: &PocketBase) -> bool {
    pb.auth_store.is_valid()
}

/// Confirm the session with PocketBase and normalize the identity.
///
/// Skips the network entirely when the credentials are not well-formed.
/// Any provider failure clears the handle and yields `None`.
pub async fn refresh_and_validate(pb: &mut PocketBase) -> Option<IdentityRecord> {
    if !is_well_formed(pb) {
        return None;
    }

    let auth = match pb.auth_refresh().await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::debug!(error = %e, "Auth refresh failed, treating as signed out");
            pb.auth_store.clear();
            return None;
        }
    };

    match IdentityRecord::from_raw(&auth.record) {
        Some(identity) => Some(identity),
        None => {
            tracing::warn!("PocketBase returned a malformed auth record");
            pb.auth_store.clear();
            None
        }
    }
}

/// Identity of the request's session cookie, plus the refreshed handle.
///
/// The handle is returned so callers can persist a rotated token.
pub async fn current_user(
    factory: &ClientFactory,
    headers: &HeaderMap,
) -> (Option<IdentityRecord>, PocketBase) {
    let mut pb = match cookie::read(headers) {
        Some(value) => factory.handle_from_cookie(&value),
        None => factory.new_handle(),
    };

    let identity = refresh_and_validate(&mut pb).await;
    (identity, pb)
}
