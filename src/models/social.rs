// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Social feature records: favorites, reviews, friend requests, notifications.

use serde::{Deserialize, Serialize};

/// A saved (favorited) rifugio.
///
/// Stored in `saved_rifugi` with document ID `{user_id}_{rifugio_id}`,
/// so saving twice is naturally idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRifugio {
    pub user_id: String,
    pub rifugio_id: u32,
    /// Denormalized for list screens
    pub rifugio_name: String,
    pub saved_at: String,
}

impl SavedRifugio {
    pub fn doc_id(user_id: &str, rifugio_id: u32) -> String {
        format!("{}_{}", user_id, rifugio_id)
    }
}

/// A user review of a rifugio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub rifugio_id: u32,
    /// 1 to 5 stars
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

/// Friend request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// A friend request between two users.
///
/// Stored in `friendRequests` with document ID `{from}_{to}`; a pair of
/// users has at most one request in each direction. An accepted request in
/// either direction makes the two users friends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: FriendRequestStatus,
    pub created_at: String,
    pub responded_at: Option<String>,
}

impl FriendRequest {
    pub fn doc_id(from_user_id: &str, to_user_id: &str) -> String {
        format!("{}_{}", from_user_id, to_user_id)
    }
}

/// An in-app notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Document ID (`{user_id}_{millis}`), generated at creation
    pub notification_id: String,
    /// Recipient uid
    pub user_id: String,
    /// Machine-readable kind ("friend_request", "friend_accepted", ...)
    pub kind: String,
    /// Display message
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: String,
}
