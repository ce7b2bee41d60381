// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! API routes for social features: favorites, reviews, friends, notifications.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{FriendRequest, FriendRequestStatus, Notification, Review, SavedRifugio};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_REVIEWS_PAGE: u32 = 50;
const DEFAULT_NOTIFICATIONS_LIMIT: u32 = 50;
const MAX_NOTIFICATIONS_LIMIT: u32 = 100;

/// Social routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/saved", get(get_saved))
        .route(
            "/api/rifugi/{id}/save",
            put(save_rifugio).delete(unsave_rifugio),
        )
        .route("/api/rifugi/{id}/reviews", post(post_review).get(get_reviews))
        .route("/api/friends", get(get_friends))
        .route("/api/friends/requests", post(send_friend_request))
        .route(
            "/api/friends/requests/{from_id}/respond",
            post(respond_friend_request),
        )
        .route("/api/notifications", get(get_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
}

// ─── Saved Rifugi ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveResponse {
    pub rifugio_id: u32,
    pub saved: bool,
}

/// Save a rifugio to the caller's favorites (idempotent).
async fn save_rifugio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u32>,
) -> Result<Json<SaveResponse>> {
    let rifugio = state
        .catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Rifugio {} not found", id)))?;

    let saved = SavedRifugio {
        user_id: user.user_id.clone(),
        rifugio_id: rifugio.id,
        rifugio_name: rifugio.name.clone(),
        saved_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.save_rifugio(&saved).await?;

    Ok(Json(SaveResponse {
        rifugio_id: id,
        saved: true,
    }))
}

/// Remove a rifugio from the caller's favorites.
async fn unsave_rifugio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u32>,
) -> Result<Json<SaveResponse>> {
    state.db.unsave_rifugio(&user.user_id, id).await?;

    Ok(Json(SaveResponse {
        rifugio_id: id,
        saved: false,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SavedSummary {
    pub rifugio_id: u32,
    pub rifugio_name: String,
    pub saved_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SavedResponse {
    pub rifugi: Vec<SavedSummary>,
}

/// List the caller's saved rifugi.
async fn get_saved(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SavedResponse>> {
    let rifugi = state
        .db
        .get_saved_for_user(&user.user_id)
        .await?
        .into_iter()
        .map(|s| SavedSummary {
            rifugio_id: s.rifugio_id,
            rifugio_name: s.rifugio_name,
            saved_at: s.saved_at,
        })
        .collect();

    Ok(Json(SavedResponse { rifugi }))
}

// ─── Reviews ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    rating: u8,
    #[validate(length(max = 2000))]
    comment: String,
}

#[derive(Serialize, Clone)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReviewSummary {
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewSummary>,
}

/// Post a review for a rifugio. One review per user per rifugio;
/// posting again replaces the previous one.
async fn post_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewSummary>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.catalog.get(id).is_none() {
        return Err(AppError::NotFound(format!("Rifugio {} not found", id)));
    }

    let review = Review {
        user_id: user.user_id.clone(),
        rifugio_id: id,
        rating: payload.rating,
        comment: payload.comment,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.set_review(&review).await?;

    Ok(Json(ReviewSummary {
        user_id: review.user_id,
        rating: review.rating,
        comment: review.comment,
        created_at: review.created_at,
    }))
}

/// List reviews for a rifugio, newest first.
async fn get_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<ReviewsResponse>> {
    if state.catalog.get(id).is_none() {
        return Err(AppError::NotFound(format!("Rifugio {} not found", id)));
    }

    let reviews = state
        .db
        .get_reviews_for_rifugio(id, MAX_REVIEWS_PAGE)
        .await?
        .into_iter()
        .map(|r| ReviewSummary {
            user_id: r.user_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(ReviewsResponse { reviews }))
}

// ─── Friends ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct FriendRequestPayload {
    #[validate(length(min = 1, max = 128))]
    to_user_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FriendRequestResponse {
    pub to_user_id: String,
    pub status: String,
}

/// Send a friend request and notify the recipient.
async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<FriendRequestPayload>,
) -> Result<Json<FriendRequestResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if payload.to_user_id == user.user_id {
        return Err(AppError::BadRequest(
            "Cannot send a friend request to yourself".to_string(),
        ));
    }

    let target = state
        .db
        .get_user(&payload.to_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", payload.to_user_id)))?;

    // A request in either direction blocks a new one
    let outgoing = state
        .db
        .get_friend_request(&user.user_id, &payload.to_user_id)
        .await?;
    let incoming = state
        .db
        .get_friend_request(&payload.to_user_id, &user.user_id)
        .await?;
    if outgoing.is_some() || incoming.is_some() {
        return Err(AppError::AlreadyDone(format!(
            "Friend request with {} already exists",
            payload.to_user_id
        )));
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    let request = FriendRequest {
        from_user_id: user.user_id.clone(),
        to_user_id: target.user_id.clone(),
        status: FriendRequestStatus::Pending,
        created_at: now.clone(),
        responded_at: None,
    };
    state.db.set_friend_request(&request).await?;

    notify(&state, &target.user_id, "friend_request", &format!(
        "Nuova richiesta di amicizia da {}",
        user.user_id
    ))
    .await;

    Ok(Json(FriendRequestResponse {
        to_user_id: request.to_user_id,
        status: "pending".to_string(),
    }))
}

#[derive(Deserialize)]
struct RespondPayload {
    accept: bool,
}

/// Accept or decline a pending friend request addressed to the caller.
async fn respond_friend_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(from_id): Path<String>,
    Json(payload): Json<RespondPayload>,
) -> Result<Json<FriendRequestResponse>> {
    let mut request = state
        .db
        .get_friend_request(&from_id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No friend request from {}", from_id)))?;

    if request.status != FriendRequestStatus::Pending {
        return Err(AppError::AlreadyDone(
            "Friend request already responded to".to_string(),
        ));
    }

    request.status = if payload.accept {
        FriendRequestStatus::Accepted
    } else {
        FriendRequestStatus::Declined
    };
    request.responded_at = Some(format_utc_rfc3339(chrono::Utc::now()));
    state.db.set_friend_request(&request).await?;

    if payload.accept {
        notify(&state, &from_id, "friend_accepted", &format!(
            "{} ha accettato la tua richiesta di amicizia",
            user.user_id
        ))
        .await;
    }

    Ok(Json(FriendRequestResponse {
        to_user_id: request.to_user_id,
        status: if payload.accept {
            "accepted".to_string()
        } else {
            "declined".to_string()
        },
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PendingRequestSummary {
    pub from_user_id: String,
    pub created_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FriendsResponse {
    /// Uids of accepted friends
    pub friends: Vec<String>,
    /// Requests awaiting the caller's response
    pub pending: Vec<PendingRequestSummary>,
}

/// List the caller's friends and pending incoming requests.
async fn get_friends(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FriendsResponse>> {
    let accepted = state.db.get_friends_for_user(&user.user_id).await?;
    let friends = accepted
        .into_iter()
        .map(|r| {
            if r.from_user_id == user.user_id {
                r.to_user_id
            } else {
                r.from_user_id
            }
        })
        .collect();

    let pending = state
        .db
        .get_pending_requests_for_user(&user.user_id)
        .await?
        .into_iter()
        .map(|r| PendingRequestSummary {
            from_user_id: r.from_user_id,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(FriendsResponse { friends, pending }))
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Deserialize)]
struct NotificationsQuery {
    limit: Option<u32>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationSummary {
    pub notification_id: String,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationSummary>,
}

/// List the caller's notifications, newest first.
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NotificationsQuery>,
) -> Result<Json<NotificationsResponse>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_NOTIFICATIONS_LIMIT)
        .min(MAX_NOTIFICATIONS_LIMIT);

    let notifications = state
        .db
        .get_notifications_for_user(&user.user_id, limit)
        .await?
        .into_iter()
        .map(|n| NotificationSummary {
            notification_id: n.notification_id,
            kind: n.kind,
            message: n.message,
            read: n.read,
            created_at: n.created_at,
        })
        .collect();

    Ok(Json(NotificationsResponse { notifications }))
}

/// Mark one of the caller's notifications as read.
async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<NotificationSummary>> {
    let mut notification = state
        .db
        .get_notification(&id)
        .await?
        .filter(|n| n.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    notification.read = true;
    state.db.set_notification(&notification).await?;

    Ok(Json(NotificationSummary {
        notification_id: notification.notification_id,
        kind: notification.kind,
        message: notification.message,
        read: notification.read,
        created_at: notification.created_at,
    }))
}

/// Store a notification for a user; failures are logged, not surfaced.
/// A lost notification must not fail the action that triggered it.
async fn notify(state: &Arc<AppState>, user_id: &str, kind: &str, message: &str) {
    let now = chrono::Utc::now();
    let notification = Notification {
        notification_id: format!("{}_{}", user_id, now.timestamp_millis()),
        user_id: user_id.to_string(),
        kind: kind.to_string(),
        message: message.to_string(),
        read: false,
        created_at: format_utc_rfc3339(now),
    };

    if let Err(e) = state.db.set_notification(&notification).await {
        tracing::warn!(error = %e, user_id, kind, "Failed to store notification");
    }
}
