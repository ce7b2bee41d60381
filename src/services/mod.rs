// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Services module - business logic layer.

pub mod catalog;
pub mod leaderboard;
pub mod monthly;
pub mod scoring;
pub mod visit;

pub use catalog::{CatalogError, CatalogService};
pub use leaderboard::{LeaderboardEntry, LeaderboardScope};
pub use visit::{RecordedVisit, VisitService};
