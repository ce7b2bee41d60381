// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! API routes for authenticated users: catalog, visits, stats, leaderboard.

use crate::db::firestore::VisitQueryCursor;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Rifugio, RifugioCategory};
use crate::services::leaderboard::{self, LeaderboardEntry, LeaderboardScope};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/rifugi", get(list_rifugi))
        .route("/api/rifugi/nearby", get(nearby_rifugi))
        .route("/api/rifugi/{id}", get(get_rifugio))
        .route("/api/visits", post(record_visit).get(get_visits))
        .route("/api/stats", get(get_stats))
        .route("/api/leaderboard", get(get_leaderboard))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    /// Monthly points counter shown on the profile (zeroed each month)
    pub points: u32,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state.db.get_user(&user.user_id).await?.ok_or_else(|| {
        crate::error::AppError::NotFound(format!("User {} not found", user.user_id))
    })?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        display_name: profile.display_name,
        email: profile.email,
        photo_url: profile.photo_url,
        points: profile.points,
    }))
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct RifugiQuery {
    /// Filter by category (rifugio | bivacco | capanna)
    category: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RifugioSummary {
    pub id: u32,
    pub name: String,
    pub locality: String,
    pub elevation_m: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub category: RifugioCategory,
}

impl From<&Rifugio> for RifugioSummary {
    fn from(r: &Rifugio) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            locality: r.locality.clone(),
            elevation_m: r.elevation_m,
            latitude: r.latitude,
            longitude: r.longitude,
            category: r.category,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RifugiResponse {
    pub rifugi: Vec<RifugioSummary>,
    pub total: u32,
}

fn parse_category(raw: &str) -> Result<RifugioCategory> {
    match raw {
        "rifugio" => Ok(RifugioCategory::Rifugio),
        "bivacco" => Ok(RifugioCategory::Bivacco),
        "capanna" => Ok(RifugioCategory::Capanna),
        other => Err(crate::error::AppError::BadRequest(format!(
            "Unknown category: {}",
            other
        ))),
    }
}

/// List the catalog, optionally filtered by category.
async fn list_rifugi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RifugiQuery>,
) -> Result<Json<RifugiResponse>> {
    let rifugi: Vec<RifugioSummary> = match params.category.as_deref() {
        Some(raw) => {
            let category = parse_category(raw)?;
            state
                .catalog
                .by_category(category)
                .into_iter()
                .map(RifugioSummary::from)
                .collect()
        }
        None => state.catalog.rifugi().iter().map(RifugioSummary::from).collect(),
    };

    let total = rifugi.len() as u32;
    Ok(Json(RifugiResponse { rifugi, total }))
}

/// Rifugio detail response, including the caller's relationship to it.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RifugioDetailResponse {
    pub id: u32,
    pub name: String,
    pub locality: String,
    pub region: Option<String>,
    pub elevation_m: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub category: RifugioCategory,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Total recorded visits across all users
    pub total_visits: u32,
    /// Whether the caller has visited
    pub visited: bool,
    /// Whether the caller has saved it
    pub saved: bool,
}

/// Get one rifugio with visit counter and caller flags.
async fn get_rifugio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u32>,
) -> Result<Json<RifugioDetailResponse>> {
    let rifugio = state
        .catalog
        .get(id)
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Rifugio {} not found", id)))?;

    let stats = state.db.get_rifugio_stats(id).await?.unwrap_or_default();
    let visited = state.db.has_visited(&user.user_id, id).await?;
    let saved = state.db.is_rifugio_saved(&user.user_id, id).await?;

    Ok(Json(RifugioDetailResponse {
        id: rifugio.id,
        name: rifugio.name.clone(),
        locality: rifugio.locality.clone(),
        region: rifugio.region.clone(),
        elevation_m: rifugio.elevation_m,
        latitude: rifugio.latitude,
        longitude: rifugio.longitude,
        category: rifugio.category,
        description: rifugio.description.clone(),
        image_url: rifugio.image_url.clone(),
        total_visits: stats.total_visits,
        visited,
        saved,
    }))
}

// ─── Nearby Lookup ───────────────────────────────────────────

const DEFAULT_NEARBY_KM: f64 = 30.0;
const MAX_NEARBY_KM: f64 = 200.0;
const DEFAULT_NEARBY_LIMIT: usize = 20;
const MAX_NEARBY_LIMIT: usize = 50;

#[derive(Deserialize)]
struct NearbyQuery {
    lat: f64,
    lng: f64,
    max_km: Option<f64>,
    limit: Option<usize>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbyRifugio {
    #[serde(flatten)]
    pub rifugio: RifugioSummary,
    pub distance_km: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbyResponse {
    pub rifugi: Vec<NearbyRifugio>,
}

/// Rifugi near a point, nearest first.
async fn nearby_rifugi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>> {
    if !(-90.0..=90.0).contains(&params.lat) || !(-180.0..=180.0).contains(&params.lng) {
        return Err(crate::error::AppError::BadRequest(
            "lat/lng out of range".to_string(),
        ));
    }

    let max_km = params
        .max_km
        .unwrap_or(DEFAULT_NEARBY_KM)
        .clamp(0.0, MAX_NEARBY_KM);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_NEARBY_LIMIT)
        .min(MAX_NEARBY_LIMIT);

    let rifugi = state
        .catalog
        .nearby(params.lat, params.lng, max_km, limit)
        .into_iter()
        .map(|(r, km)| NearbyRifugio {
            rifugio: RifugioSummary::from(r),
            distance_km: km,
        })
        .collect();

    Ok(Json(NearbyResponse { rifugi }))
}

// ─── Visits ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct RecordVisitRequest {
    rifugio_id: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VisitResponse {
    pub rifugio_id: u32,
    pub rifugio_name: String,
    pub points_earned: u32,
    pub double_points: bool,
    /// Display message explaining the award
    pub reason: String,
    pub visited_at: String,
}

/// Record a visit for a scanned rifugio marker.
async fn record_visit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RecordVisitRequest>,
) -> Result<Json<VisitResponse>> {
    let recorded = state
        .visit_service
        .record_visit(&user.user_id, payload.rifugio_id)
        .await?;

    Ok(Json(VisitResponse {
        rifugio_id: recorded.visit.rifugio_id,
        rifugio_name: recorded.visit.rifugio_name,
        points_earned: recorded.visit.points_earned,
        double_points: recorded.visit.double_points,
        reason: recorded.reason.to_string(),
        visited_at: recorded.visit.visited_at,
    }))
}

#[derive(Deserialize)]
struct VisitsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;

fn parse_cursor(cursor: Option<&str>) -> Result<Option<VisitQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || crate::error::AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let (visited_at, rifugio_id) = decoded_str.rsplit_once('|').ok_or_else(invalid_cursor)?;
            chrono::DateTime::parse_from_rfc3339(visited_at).map_err(|_| invalid_cursor())?;
            let rifugio_id = rifugio_id.parse::<u32>().map_err(|_| invalid_cursor())?;

            Ok(VisitQueryCursor {
                visited_at: visited_at.to_string(),
                rifugio_id,
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &VisitQueryCursor) -> String {
    let payload = format!("{}|{}", cursor.visited_at, cursor.rifugio_id);
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VisitSummary {
    pub rifugio_id: u32,
    pub rifugio_name: String,
    pub points_earned: u32,
    pub double_points: bool,
    pub visited_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VisitsResponse {
    pub visits: Vec<VisitSummary>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// Get the caller's visit history, newest first.
async fn get_visits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<VisitsQuery>,
) -> Result<Json<VisitsResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        cursor = ?params.cursor,
        "Fetching visit history"
    );

    let limit = params.per_page.min(MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let fetch_limit = limit.saturating_add(1);
    let mut results = state
        .db
        .get_visits_for_user(&user.user_id, cursor, fetch_limit)
        .await?;

    let has_more = results.len() > limit as usize;
    if has_more {
        results.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        results.last().map(|v| {
            encode_cursor(&VisitQueryCursor {
                visited_at: v.visited_at.clone(),
                rifugio_id: v.rifugio_id,
            })
        })
    } else {
        None
    };

    let visits = results
        .into_iter()
        .map(|v| VisitSummary {
            rifugio_id: v.rifugio_id,
            rifugio_name: v.rifugio_name,
            points_earned: v.points_earned,
            double_points: v.double_points,
            visited_at: v.visited_at,
        })
        .collect();

    Ok(Json(VisitsResponse {
        visits,
        per_page: limit,
        next_cursor,
    }))
}

// ─── Aggregate Stats ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub total_points: u32,
    pub total_visits: u32,
    pub monthly_points: u32,
    pub monthly_visits: u32,
    pub last_updated: String,
}

/// Get the caller's aggregates (1 Firestore read; zeros if never visited).
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse>> {
    let stats = state
        .db
        .get_user_points_stats(&user.user_id)
        .await?
        .unwrap_or_default();

    Ok(Json(StatsResponse {
        total_points: stats.total_points,
        total_visits: stats.total_visits,
        monthly_points: stats.monthly_points,
        monthly_visits: stats.monthly_visits,
        last_updated: stats.last_updated,
    }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// "global" (default) or "monthly"
    scope: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub scope: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Ranked leaderboard over user aggregates.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let raw_scope = params.scope.as_deref().unwrap_or("global");
    let scope = LeaderboardScope::parse(raw_scope).ok_or_else(|| {
        crate::error::AppError::BadRequest(format!("Unknown leaderboard scope: {}", raw_scope))
    })?;

    let stats = state
        .db
        .get_leaderboard_stats(leaderboard::LEADERBOARD_FETCH_LIMIT)
        .await?;
    let entries = leaderboard::rank_stats(stats, scope);

    Ok(Json(LeaderboardResponse {
        scope: raw_scope.to_string(),
        entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = VisitQueryCursor {
            visited_at: "2026-01-15T10:00:00Z".to_string(),
            rifugio_id: 42,
        };

        let encoded = encode_cursor(&cursor);
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = parse_cursor(Some("not-base64")).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));

        let bad_date = URL_SAFE_NO_PAD.encode("yesterday|42");
        let err = parse_cursor(Some(&bad_date)).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));
    }
}
