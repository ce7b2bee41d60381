// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Monthly challenge lifecycle and the guarded counter reset.
//!
//! One `monthly_challenges` document exists per calendar month, created
//! lazily on first access. Its `reset_done` flag latches the reset job:
//! the first run in a month zeroes every user's monthly counters, later
//! runs early-return. Two callers racing past the latch both zero the
//! counters, which is wasteful but harmless.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::MonthlyChallenge;
use crate::time_utils::{format_utc_rfc3339, month_bounds, month_key};
use chrono::{DateTime, Utc};

/// Result of one reset invocation.
#[derive(Debug, Clone)]
pub struct ResetOutcome {
    pub month_key: String,
    /// True when the latch was already set and nothing was written
    pub already_done: bool,
    pub users_zeroed: usize,
    pub stats_zeroed: usize,
}

/// Fetch this month's challenge, creating it if this is the first access
/// in the month.
pub async fn get_or_create_challenge(
    db: &FirestoreDb,
    now: DateTime<Utc>,
) -> Result<MonthlyChallenge> {
    let key = month_key(now);
    if let Some(challenge) = db.get_monthly_challenge(&key).await? {
        return Ok(challenge);
    }

    let (start_date, end_date) = month_bounds(now);
    let challenge = MonthlyChallenge::new(key.clone(), start_date, end_date);
    db.set_monthly_challenge(&challenge).await?;
    tracing::info!(month_key = %key, "Created monthly challenge");
    Ok(challenge)
}

/// Run the monthly reset for the month containing `now`.
///
/// Zeroes the legacy `points` field on every user document and the monthly
/// fields on every stats document, then sets `reset_done`. Lifetime totals
/// and other months' ledgers are untouched. Idempotent per month via the
/// latch; documents already at zero are skipped to save writes.
pub async fn run_monthly_reset(db: &FirestoreDb, now: DateTime<Utc>) -> Result<ResetOutcome> {
    let mut challenge = get_or_create_challenge(db, now).await?;

    if challenge.reset_done {
        tracing::info!(month_key = %challenge.month_key, "Monthly reset already done, skipping");
        return Ok(ResetOutcome {
            month_key: challenge.month_key,
            already_done: true,
            users_zeroed: 0,
            stats_zeroed: 0,
        });
    }

    let now_str = format_utc_rfc3339(now);

    let mut users = db.list_users().await?;
    users.retain(|u| u.points != 0);
    for user in &mut users {
        user.points = 0;
    }
    db.batch_update_users(&users).await?;

    let mut stats = db.list_points_stats().await?;
    stats.retain(|s| s.monthly_points != 0 || s.monthly_visits != 0);
    for entry in &mut stats {
        entry.reset_monthly(&now_str);
    }
    db.batch_update_points_stats(&stats).await?;

    challenge.reset_done = true;
    db.set_monthly_challenge(&challenge).await?;

    tracing::info!(
        month_key = %challenge.month_key,
        users_zeroed = users.len(),
        stats_zeroed = stats.len(),
        "Monthly reset complete"
    );

    Ok(ResetOutcome {
        month_key: challenge.month_key,
        already_done: false,
        users_zeroed: users.len(),
        stats_zeroed: stats.len(),
    })
}
