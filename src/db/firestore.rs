// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, legacy points counter)
//! - Visit ledger (`user_points`) and per-user aggregates
//! - Per-rifugio counters and monthly challenges
//! - Social collections (saved rifugi, reviews, friend requests, notifications)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    FriendRequest, MonthlyChallenge, Notification, Review, RifugioStats, SavedRifugio, User,
    UserPointsStats, VisitRecord,
};
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Cursor for visit-history pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitQueryCursor {
    /// `visited_at` of the last row on the previous page (ISO 8601)
    pub visited_at: String,
    /// Rifugio id of that row, for cursor opacity
    pub rifugio_id: u32,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by uid.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all user profiles (monthly reset input).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Visit Ledger Operations ─────────────────────────────────

    /// Get a single visit ledger entry, if any.
    pub async fn get_visit(
        &self,
        user_id: &str,
        rifugio_id: u32,
    ) -> Result<Option<VisitRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_POINTS)
            .obj()
            .one(&VisitRecord::doc_id(user_id, rifugio_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a ledger entry exists for the pair.
    pub async fn has_visited(&self, user_id: &str, rifugio_id: u32) -> Result<bool, AppError> {
        Ok(self.get_visit(user_id, rifugio_id).await?.is_some())
    }

    /// Get a user's visit history, newest first, with cursor pagination.
    pub async fn get_visits_for_user(
        &self,
        user_id: &str,
        cursor: Option<VisitQueryCursor>,
        limit: u32,
    ) -> Result<Vec<VisitRecord>, AppError> {
        let user_id = user_id.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USER_POINTS);

        let query = if let Some(cursor) = cursor {
            let after = cursor.visited_at;
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("visited_at").less_than(after.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(user_id.clone()))
        };

        query
            .order_by([(
                "visited_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Visit Recording ──────────────────────────────────

    /// Atomically record a visit: ledger entry, user aggregates, rifugio
    /// counter, and the user's legacy points field in one transaction.
    ///
    /// If another request touches the same documents concurrently, Firestore
    /// retries the transaction with fresh data, preventing lost updates.
    ///
    /// Returns `true` if the visit was newly recorded, `false` if a ledger
    /// entry already existed (idempotent duplicate).
    pub async fn record_visit_atomic(&self, visit: &VisitRecord) -> Result<bool, AppError> {
        let user_id = visit.user_id.clone();
        let rifugio_id = visit.rifugio_id;
        let doc_id = VisitRecord::doc_id(&user_id, rifugio_id);

        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Re-check the ledger within the transaction.
        //    This registers the document for conflict detection.
        let existing: Option<VisitRecord> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_POINTS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read ledger in transaction: {}", e))
            })?;

        if existing.is_some() {
            tracing::debug!(
                user_id = %user_id,
                rifugio_id,
                "Visit already recorded (idempotent skip)"
            );
            // Rollback the transaction since we don't need to write
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 2. Read and fold the user aggregates
        let mut stats: UserPointsStats = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_POINTS_STATS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read stats in transaction: {}", e))
            })?
            .unwrap_or_default();
        stats.user_id = user_id.clone();
        stats.update_from_visit(visit, &visit.visited_at);

        // 3. Read and bump the rifugio counter
        let mut rifugio_stats: RifugioStats = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RIFUGIO_STATS)
            .obj()
            .one(&rifugio_id.to_string())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read rifugio stats in transaction: {}", e))
            })?
            .unwrap_or_default();
        rifugio_stats.record_visit(rifugio_id, &visit.visited_at);

        // 4. Keep the profile's legacy points counter and activity timestamp
        //    in step. A missing profile is tolerated (created at sign-in).
        let user_profile: Option<User> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read user in transaction: {}", e))
            })?;

        // 5. Queue all writes on the transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_POINTS)
            .document_id(&doc_id)
            .object(visit)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add visit to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_POINTS_STATS)
            .document_id(&user_id)
            .object(&stats)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add stats to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::RIFUGIO_STATS)
            .document_id(rifugio_id.to_string())
            .object(&rifugio_stats)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add rifugio stats to transaction: {}",
                    e
                ))
            })?;

        if let Some(mut profile) = user_profile {
            profile.points += visit.points_earned;
            profile.last_active = visit.visited_at.clone();
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user_id)
                .object(&profile)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;
        }

        // 6. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            rifugio_id,
            points = visit.points_earned,
            "Visit recorded atomically"
        );

        Ok(true)
    }

    // ─── User Stats Operations ───────────────────────────────────

    /// Get the aggregate document for a user.
    pub async fn get_user_points_stats(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPointsStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_POINTS_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the aggregate document for a user.
    pub async fn set_user_points_stats(
        &self,
        user_id: &str,
        stats: &UserPointsStats,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_POINTS_STATS)
            .document_id(user_id)
            .object(stats)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all aggregate documents (monthly reset input).
    pub async fn list_points_stats(&self) -> Result<Vec<UserPointsStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_POINTS_STATS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch aggregate documents for a leaderboard view, bounded by `limit`.
    ///
    /// Ranking and tie-breaks happen in memory; the fetch bound is the only
    /// pagination the leaderboard has.
    pub async fn get_leaderboard_stats(
        &self,
        limit: u32,
    ) -> Result<Vec<UserPointsStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_POINTS_STATS)
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Rifugio Stats Operations ────────────────────────────────

    /// Get the visit counter for a rifugio.
    pub async fn get_rifugio_stats(
        &self,
        rifugio_id: u32,
    ) -> Result<Option<RifugioStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RIFUGIO_STATS)
            .obj()
            .one(rifugio_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Monthly Challenge Operations ────────────────────────────

    /// Get the challenge document for a month key ("YYYY-MM").
    pub async fn get_monthly_challenge(
        &self,
        month_key: &str,
    ) -> Result<Option<MonthlyChallenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MONTHLY_CHALLENGES)
            .obj()
            .one(month_key)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a challenge document (keyed by month key).
    pub async fn set_monthly_challenge(
        &self,
        challenge: &MonthlyChallenge,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MONTHLY_CHALLENGES)
            .document_id(&challenge.month_key)
            .object(challenge)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Batched Writes (monthly reset) ──────────────────────────

    /// Helper to batch update documents using transactions.
    async fn batch_update<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        T: Serialize + Send + Sync + for<'de> Deserialize<'de>,
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&doc_id)
                    .object(item)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add update to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit batch update: {}", e)))?;
        }

        Ok(())
    }

    /// Write back a batch of user profiles (chunked transactions).
    pub async fn batch_update_users(&self, users: &[User]) -> Result<(), AppError> {
        self.batch_update(users, collections::USERS, |u: &User| u.user_id.clone())
            .await
    }

    /// Write back a batch of aggregate documents (chunked transactions).
    pub async fn batch_update_points_stats(
        &self,
        stats: &[UserPointsStats],
    ) -> Result<(), AppError> {
        self.batch_update(stats, collections::USER_POINTS_STATS, |s: &UserPointsStats| {
            s.user_id.clone()
        })
        .await
    }

    // ─── Saved Rifugi Operations ─────────────────────────────────

    /// Save a rifugio for a user (idempotent by document ID).
    pub async fn save_rifugio(&self, saved: &SavedRifugio) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SAVED_RIFUGI)
            .document_id(SavedRifugio::doc_id(&saved.user_id, saved.rifugio_id))
            .object(saved)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a saved rifugio.
    pub async fn unsave_rifugio(&self, user_id: &str, rifugio_id: u32) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SAVED_RIFUGI)
            .document_id(SavedRifugio::doc_id(user_id, rifugio_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Whether a rifugio is saved by the user.
    pub async fn is_rifugio_saved(
        &self,
        user_id: &str,
        rifugio_id: u32,
    ) -> Result<bool, AppError> {
        let saved: Option<SavedRifugio> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SAVED_RIFUGI)
            .obj()
            .one(&SavedRifugio::doc_id(user_id, rifugio_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(saved.is_some())
    }

    /// List a user's saved rifugi, newest first.
    pub async fn get_saved_for_user(&self, user_id: &str) -> Result<Vec<SavedRifugio>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SAVED_RIFUGI)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("saved_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Review Operations ───────────────────────────────────────

    /// Store a review. Document ID `{user_id}_{rifugio_id}` keeps one
    /// review per user per rifugio; posting again overwrites.
    pub async fn set_review(&self, review: &Review) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", review.user_id, review.rifugio_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REVIEWS)
            .document_id(&doc_id)
            .object(review)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List reviews for a rifugio, newest first, bounded by `limit`.
    pub async fn get_reviews_for_rifugio(
        &self,
        rifugio_id: u32,
        limit: u32,
    ) -> Result<Vec<Review>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REVIEWS)
            .filter(move |q| q.field("rifugio_id").eq(rifugio_id))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Friend Request Operations ───────────────────────────────

    /// Get a friend request by its (from, to) pair.
    pub async fn get_friend_request(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<Option<FriendRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FRIEND_REQUESTS)
            .obj()
            .one(&FriendRequest::doc_id(from_user_id, to_user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a friend request.
    pub async fn set_friend_request(&self, request: &FriendRequest) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FRIEND_REQUESTS)
            .document_id(FriendRequest::doc_id(
                &request.from_user_id,
                &request.to_user_id,
            ))
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Pending requests addressed to a user.
    pub async fn get_pending_requests_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequest>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("to_user_id").eq(user_id.clone()),
                    q.field("status").eq("pending"),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accepted requests involving a user, in either direction.
    /// The union is the user's friend list.
    pub async fn get_friends_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequest>, AppError> {
        let sent_filter = user_id.to_string();
        let sent = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("from_user_id").eq(sent_filter.clone()),
                    q.field("status").eq("accepted"),
                ])
            })
            .obj::<FriendRequest>()
            .query();

        let received_filter = user_id.to_string();
        let received = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FRIEND_REQUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("to_user_id").eq(received_filter.clone()),
                    q.field("status").eq("accepted"),
                ])
            })
            .obj::<FriendRequest>()
            .query();

        let (mut all, received) = futures_util::try_join!(sent, received)
            .map_err(|e| AppError::Database(e.to_string()))?;
        all.extend(received);
        Ok(all)
    }

    // ─── Notification Operations ─────────────────────────────────

    /// Store a notification (keyed by its generated ID).
    pub async fn set_notification(&self, notification: &Notification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.notification_id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a notification by ID.
    pub async fn get_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<Notification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .obj()
            .one(notification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's notifications, newest first, bounded by `limit`.
    pub async fn get_notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
