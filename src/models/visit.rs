// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Visit ledger record.

use serde::{Deserialize, Serialize};

/// A recorded visit to a rifugio.
///
/// Stored in `user_points` with document ID `{user_id}_{rifugio_id}`, so at
/// most one record can exist per pair. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Visiting user (identity-provider uid)
    pub user_id: String,
    /// Catalog ID of the visited rifugio
    pub rifugio_id: u32,
    /// Rifugio name, denormalized for history screens
    pub rifugio_name: String,
    /// Points granted for this visit
    pub points_earned: u32,
    /// Visit timestamp (ISO 8601)
    pub visited_at: String,
    /// Whether the bonus-location doubling applied
    pub double_points: bool,
}

impl VisitRecord {
    /// Ledger document ID for a (user, rifugio) pair.
    pub fn doc_id(user_id: &str, rifugio_id: u32) -> String {
        format!("{}_{}", user_id, rifugio_id)
    }
}
