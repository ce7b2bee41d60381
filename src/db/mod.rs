//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
///
/// These names are the wire contract shared with the mobile clients;
/// renaming any of them is a breaking change.
pub mod collections {
    pub const USERS: &str = "users";
    /// Visit ledger (one document per user/rifugio pair)
    pub const USER_POINTS: &str = "user_points";
    /// Per-user aggregate totals (keyed by user id)
    pub const USER_POINTS_STATS: &str = "user_points_stats";
    /// Per-rifugio visit counters (keyed by rifugio id)
    pub const RIFUGIO_STATS: &str = "rifugio_stats";
    /// One document per calendar month (keyed by "YYYY-MM")
    pub const MONTHLY_CHALLENGES: &str = "monthly_challenges";
    pub const SAVED_RIFUGI: &str = "saved_rifugi";
    pub const REVIEWS: &str = "reviews";
    pub const FRIEND_REQUESTS: &str = "friendRequests";
    pub const NOTIFICATIONS: &str = "notifications";
}
