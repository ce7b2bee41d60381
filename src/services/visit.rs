// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Visit recording service.
//!
//! Handles the core workflow:
//! 1. Look up the scanned rifugio in the catalog
//! 2. Gate on the ledger (one visit per user/rifugio pair, ever)
//! 3. Score the visit
//! 4. Atomically write ledger entry, user aggregates, and rifugio counter

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::VisitRecord;
use crate::services::scoring;
use crate::services::CatalogService;
use crate::time_utils::format_utc_rfc3339;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user in-process locks. Two scans racing from the same phone would
/// otherwise both pass the fast duplicate check and burn a transaction
/// retry; the Firestore transaction stays the cross-instance guarantee.
pub type VisitLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Outcome of a successfully recorded visit.
#[derive(Debug, Clone)]
pub struct RecordedVisit {
    pub visit: VisitRecord,
    pub reason: &'static str,
}

/// Records visits against the catalog and the ledger.
#[derive(Clone)]
pub struct VisitService {
    db: FirestoreDb,
    catalog: CatalogService,
    locks: VisitLocks,
}

impl VisitService {
    pub fn new(db: FirestoreDb, catalog: CatalogService, locks: VisitLocks) -> Self {
        Self { db, catalog, locks }
    }

    /// Whether the user has already visited the rifugio.
    pub async fn has_visited(&self, user_id: &str, rifugio_id: u32) -> Result<bool> {
        self.db.has_visited(user_id, rifugio_id).await
    }

    /// Record a visit for a scanned rifugio marker.
    ///
    /// Fails with `NotFound` for unknown catalog ids and `AlreadyDone` for
    /// repeat visits. On success the ledger entry, the user's aggregates,
    /// and the rifugio counter have all been committed together.
    pub async fn record_visit(&self, user_id: &str, rifugio_id: u32) -> Result<RecordedVisit> {
        let rifugio = self
            .catalog
            .get(rifugio_id)
            .ok_or_else(|| AppError::NotFound(format!("Rifugio {} not found", rifugio_id)))?;

        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Fast duplicate check; the transaction re-checks under isolation.
        if self.db.has_visited(user_id, rifugio_id).await? {
            return Err(AppError::AlreadyDone(format!(
                "Rifugio {} already visited",
                rifugio_id
            )));
        }

        let scored = scoring::score_visit(rifugio.id, rifugio.elevation_m);
        let visit = VisitRecord {
            user_id: user_id.to_string(),
            rifugio_id: rifugio.id,
            rifugio_name: rifugio.name.clone(),
            points_earned: scored.points,
            visited_at: format_utc_rfc3339(chrono::Utc::now()),
            double_points: scored.double_points,
        };

        let was_new = self.db.record_visit_atomic(&visit).await?;
        if !was_new {
            return Err(AppError::AlreadyDone(format!(
                "Rifugio {} already visited",
                rifugio_id
            )));
        }

        tracing::info!(
            user_id,
            rifugio_id,
            points = scored.points,
            double_points = scored.double_points,
            "Visit recorded"
        );

        Ok(RecordedVisit {
            visit,
            reason: scored.reason,
        })
    }
}
