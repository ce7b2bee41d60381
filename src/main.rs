// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Rifugio-Tracker API Server
//!
//! Tracks visits to mountain refuges: users scan a marker at a rifugio, earn
//! points based on elevation and bonus status, and compete on monthly and
//! all-time leaderboards.

use rifugio_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{CatalogService, VisitService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Rifugio-Tracker API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Load the bundled rifugio catalog
    let catalog_path = "data/rifugi.json";
    tracing::info!(path = catalog_path, "Loading rifugio catalog");
    let catalog = CatalogService::load_from_file(catalog_path).expect("Failed to load catalog");
    tracing::info!(count = catalog.rifugi().len(), "Rifugio catalog loaded");

    // Initialize the visit recording service.
    // The per-user lock map is shared across all requests within this instance.
    let visit_locks = Arc::new(dashmap::DashMap::new());
    let visit_service = VisitService::new(db.clone(), catalog.clone(), visit_locks);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        catalog,
        visit_service,
    });

    // Build router
    let app = rifugio_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rifugio_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
