// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Task handler routes for scheduled maintenance callbacks.
//!
//! These endpoints are called by Cloud Tasks, not directly by users.

use crate::services::monthly;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::sync::Arc;

/// Task handler routes (called by Cloud Tasks).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/monthly-reset", post(monthly_reset))
}

/// Run the monthly counter reset (called by Cloud Tasks at month start).
async fn monthly_reset(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> StatusCode {
    // Security Check: Ensure request comes from Cloud Tasks
    // Cloud Run strips this header from external requests, so its presence guarantees internal origin.
    // We also verify the queue name to ensure it matches our expected queue.
    let queue_name_header = headers.get("x-cloudtasks-queuename");
    let is_valid_queue = queue_name_header
        .and_then(|h| h.to_str().ok())
        .map(|name| name == crate::config::RESET_QUEUE_NAME)
        .unwrap_or(false);

    if !is_valid_queue {
        tracing::warn!(
            header = ?queue_name_header,
            "Security Alert: Blocked unauthorized access to monthly_reset"
        );
        return StatusCode::FORBIDDEN;
    }

    tracing::info!("Running monthly reset from Cloud Task");

    match monthly::run_monthly_reset(&state.db, chrono::Utc::now()).await {
        Ok(outcome) if outcome.already_done => {
            tracing::info!(
                month_key = %outcome.month_key,
                "Monthly reset already done for this month"
            );
            StatusCode::OK
        }
        Ok(outcome) => {
            tracing::info!(
                month_key = %outcome.month_key,
                users_zeroed = outcome.users_zeroed,
                stats_zeroed = outcome.stats_zeroed,
                "Monthly reset completed"
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Monthly reset failed");
            // Return 500 to trigger Cloud Tasks retry
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
