// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Data models for the application.

pub mod challenge;
pub mod rifugio;
pub mod social;
pub mod stats;
pub mod user;
pub mod visit;

pub use challenge::MonthlyChallenge;
pub use rifugio::{Rifugio, RifugioCategory};
pub use social::{FriendRequest, FriendRequestStatus, Notification, Review, SavedRifugio};
pub use stats::{RifugioStats, UserPointsStats};
pub use user::User;
pub use visit::VisitRecord;
