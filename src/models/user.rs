//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider uid (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name
    pub display_name: String,
    /// Profile picture URL
    pub photo_url: Option<String>,
    /// Running monthly points counter shown on profile screens.
    /// Distinct from `UserPointsStats::total_points`; zeroed by the
    /// monthly reset job. Kept for client compatibility.
    #[serde(default)]
    pub points: u32,
    /// When the user first signed in
    pub created_at: String,
    /// Last activity timestamp
    pub last_active: String,
}
