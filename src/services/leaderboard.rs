// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Leaderboard ranking over user point aggregates.

use crate::models::UserPointsStats;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound on stats documents fetched for one leaderboard view.
pub const LEADERBOARD_FETCH_LIMIT: u32 = 100;

/// Which point total the leaderboard ranks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardScope {
    Global,
    Monthly,
}

impl LeaderboardScope {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "global" => Some(Self::Global),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// One ranked row.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting
    pub rank: u32,
    pub user_id: String,
    pub points: u32,
    pub visits: u32,
}

/// Rank stats rows for the given scope.
///
/// Descending by points, ties broken by ascending user id so the order is
/// deterministic regardless of fetch order. Rank is the 1-based sorted
/// position.
pub fn rank_stats(mut stats: Vec<UserPointsStats>, scope: LeaderboardScope) -> Vec<LeaderboardEntry> {
    let key = |s: &UserPointsStats| match scope {
        LeaderboardScope::Global => s.total_points,
        LeaderboardScope::Monthly => s.monthly_points,
    };

    stats.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.user_id.cmp(&b.user_id)));

    stats
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let points = match scope {
                LeaderboardScope::Global => s.total_points,
                LeaderboardScope::Monthly => s.monthly_points,
            };
            let visits = match scope {
                LeaderboardScope::Global => s.total_visits,
                LeaderboardScope::Monthly => s.monthly_visits,
            };
            LeaderboardEntry {
                rank: i as u32 + 1,
                user_id: s.user_id,
                points,
                visits,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(user_id: &str, total: u32, monthly: u32) -> UserPointsStats {
        UserPointsStats {
            user_id: user_id.to_string(),
            total_points: total,
            total_visits: total / 10,
            monthly_points: monthly,
            monthly_visits: monthly / 10,
            last_updated: String::new(),
        }
    }

    #[test]
    fn test_global_ranking_with_tie() {
        let rows = rank_stats(
            vec![stats("a", 300, 0), stats("b", 100, 0), stats("c", 300, 0)],
            LeaderboardScope::Global,
        );

        // a and c tie at 300 and both rank ahead of b; b is third
        assert_eq!(rows[0].user_id, "a");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].user_id, "c");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[2].user_id, "b");
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // Same input in a different fetch order gives the same ranking
        let first = rank_stats(
            vec![stats("c", 300, 0), stats("a", 300, 0)],
            LeaderboardScope::Global,
        );
        let second = rank_stats(
            vec![stats("a", 300, 0), stats("c", 300, 0)],
            LeaderboardScope::Global,
        );

        let ids = |rows: &[LeaderboardEntry]| {
            rows.iter().map(|r| r.user_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_monthly_scope_uses_monthly_points() {
        let rows = rank_stats(
            vec![stats("a", 500, 10), stats("b", 100, 40)],
            LeaderboardScope::Monthly,
        );

        assert_eq!(rows[0].user_id, "b");
        assert_eq!(rows[0].points, 40);
        assert_eq!(rows[1].user_id, "a");
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(LeaderboardScope::parse("global"), Some(LeaderboardScope::Global));
        assert_eq!(LeaderboardScope::parse("monthly"), Some(LeaderboardScope::Monthly));
        assert_eq!(LeaderboardScope::parse("weekly"), None);
    }
}
