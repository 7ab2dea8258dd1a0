// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Blog API: backend for a small blogging application.
//!
//! This crate provides account registration and login, signed session
//! tokens, and the post/comment/star surface consumed by the web
//! front end.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::AccountService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub accounts: AccountService,
}
