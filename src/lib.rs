// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PocketKit: cookie-based PocketBase sessions for server-rendered apps.
//!
//! This crate keeps the PocketBase auth token in an httpOnly cookie,
//! rebuilds a client handle from it on every request, gates pages on the
//! session and confirms it with PocketBase when a page needs the user.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::ClientFactory;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub clients: ClientFactory,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let clients = ClientFactory::new(&config);
        Self { config, clients }
    }
}
