// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Rifugio-Tracker: gamified tracking of mountain refuge visits.
//!
//! This crate provides the backend API for the rifugio catalog, the visit
//! ledger with point scoring, per-user aggregates and leaderboards, and the
//! monthly challenge reset job.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{CatalogService, VisitService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub catalog: CatalogService,
    pub visit_service: VisitService,
}
