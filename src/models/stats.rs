//! Per-user and per-rifugio aggregates for efficient dashboard queries.
//!
//! These aggregates are pre-computed when visits are recorded, reducing
//! leaderboard and profile reads from O(visits) to O(1).

use serde::{Deserialize, Serialize};

use crate::models::VisitRecord;
use crate::time_utils::extract_month_key;

/// Pre-computed point totals for a user.
///
/// Stored in `user_points_stats`, keyed by user id.
/// Updated atomically with the visit write via Firestore transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPointsStats {
    /// Owner uid (duplicated from the document ID for queries)
    #[serde(default)]
    pub user_id: String,
    /// Lifetime points
    #[serde(default)]
    pub total_points: u32,
    /// Lifetime visit count
    #[serde(default)]
    pub total_visits: u32,
    /// Points in the current calendar month
    #[serde(default)]
    pub monthly_points: u32,
    /// Visits in the current calendar month
    #[serde(default)]
    pub monthly_visits: u32,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub last_updated: String,
}

impl Default for UserPointsStats {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            total_points: 0,
            total_visits: 0,
            monthly_points: 0,
            monthly_visits: 0,
            last_updated: String::new(),
        }
    }
}

impl UserPointsStats {
    /// Fold a new visit into the aggregates.
    ///
    /// Lifetime counters always accumulate. Monthly counters accumulate only
    /// when the visit falls in the same calendar month as `now`; otherwise
    /// they restart from this single visit. A backdated visit therefore
    /// clobbers the current month's counters rather than being skipped --
    /// visits only ever arrive with a current timestamp, so the branch is
    /// effectively "first visit of a new month starts the new month".
    pub fn update_from_visit(&mut self, visit: &VisitRecord, now: &str) {
        self.total_points += visit.points_earned;
        self.total_visits += 1;

        let same_month = match (
            extract_month_key(&visit.visited_at),
            extract_month_key(now),
        ) {
            (Some(visit_month), Some(current_month)) => visit_month == current_month,
            _ => false,
        };

        if same_month {
            self.monthly_points += visit.points_earned;
            self.monthly_visits += 1;
        } else {
            self.monthly_points = visit.points_earned;
            self.monthly_visits = 1;
        }

        self.last_updated = now.to_string();
    }

    /// Zero the monthly counters (monthly reset job).
    /// Lifetime totals are untouched.
    pub fn reset_monthly(&mut self, now: &str) {
        self.monthly_points = 0;
        self.monthly_visits = 0;
        self.last_updated = now.to_string();
    }
}

/// Visit counter for a single rifugio.
///
/// Stored in `rifugio_stats`, keyed by catalog id. Incremented inside the
/// visit transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RifugioStats {
    #[serde(default)]
    pub rifugio_id: u32,
    /// Total recorded visits across all users
    #[serde(default)]
    pub total_visits: u32,
    /// Most recent visit timestamp (ISO 8601)
    #[serde(default)]
    pub last_visit_at: String,
}

impl RifugioStats {
    pub fn record_visit(&mut self, rifugio_id: u32, visited_at: &str) {
        self.rifugio_id = rifugio_id;
        self.total_visits += 1;
        self.last_visit_at = visited_at.to_string();
    }
}
