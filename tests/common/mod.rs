// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

use rifugio_tracker::config::Config;
use rifugio_tracker::db::FirestoreDb;
use rifugio_tracker::routes::create_router;
use rifugio_tracker::services::{CatalogService, VisitService};
use rifugio_tracker::AppState;
use std::sync::Arc;

/// Small catalog used by router tests. Id 1 is in the bonus set and id 11
/// sits above 3000 m, mirroring the interesting scoring branches.
#[allow(dead_code)]
pub const TEST_CATALOG: &str = r#"{
    "rifugi": [
        {
            "id": 1,
            "name": "Rifugio Carlo Porta",
            "locality": "Piani dei Resinelli",
            "region": "Lombardia",
            "elevation_m": 1498,
            "latitude": 45.9095,
            "longitude": 9.3745,
            "category": "rifugio",
            "description": null,
            "image_url": null
        },
        {
            "id": 2,
            "name": "Rifugio Luigi Brioschi",
            "locality": "Grigna Settentrionale",
            "region": "Lombardia",
            "elevation_m": 2410,
            "latitude": 45.9573,
            "longitude": 9.3880,
            "category": "rifugio",
            "description": null,
            "image_url": null
        },
        {
            "id": 11,
            "name": "Capanna Regina Margherita",
            "locality": "Monte Rosa",
            "region": "Piemonte",
            "elevation_m": 3375,
            "latitude": 45.9270,
            "longitude": 7.8770,
            "category": "capanna",
            "description": null,
            "image_url": null
        }
    ]
}"#;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test catalog from the embedded fixture.
#[allow(dead_code)]
pub fn test_catalog() -> CatalogService {
    CatalogService::load_from_json(TEST_CATALOG).expect("Failed to load test catalog")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app over an explicit database (mock or emulator).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let catalog = test_catalog();

    let visit_locks = Arc::new(dashmap::DashMap::new());
    let visit_service = VisitService::new(db.clone(), catalog.clone(), visit_locks);

    let state = Arc::new(AppState {
        config,
        db,
        catalog,
        visit_service,
    });

    (create_router(state.clone()), state)
}

/// Mint a session JWT the way the identity provider would.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    rifugio_tracker::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}
