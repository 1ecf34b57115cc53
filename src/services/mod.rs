// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - PocketBase integration and session handling.

pub mod auth_store;
pub mod cookie;
pub mod factory;
pub mod pocketbase;
pub mod session;

pub use auth_store::AuthStore;
pub use cookie::CookieExportError;
pub use factory::ClientFactory;
pub use pocketbase::{AuthResponse, PocketBase, ProviderError};
pub use session::{current_user, is_well_formed, refresh_and_validate};
