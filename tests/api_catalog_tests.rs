// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Catalog endpoints work entirely from the in-memory catalog,
//! so these run offline against the mock database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn get_json(
    app: axum::Router,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_list_rifugi() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let (status, body) = get_json(app, "/api/rifugi", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["rifugi"][0]["id"], 1);
    assert_eq!(body["rifugi"][0]["name"], "Rifugio Carlo Porta");
}

#[tokio::test]
async fn test_list_rifugi_filtered_by_category() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let (status, body) = get_json(app, "/api/rifugi?category=capanna", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["rifugi"][0]["id"], 11);
}

#[tokio::test]
async fn test_nearby_returns_closest_first() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    // Standing at Rifugio Carlo Porta: it and the Brioschi (a few km away)
    // are in range, the Margherita (~120 km west) is not.
    let (status, body) = get_json(
        app,
        "/api/rifugi/nearby?lat=45.9095&lng=9.3745&max_km=20",
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rifugi = body["rifugi"].as_array().unwrap();
    assert_eq!(rifugi.len(), 2);
    assert_eq!(rifugi[0]["id"], 1);
    assert_eq!(rifugi[1]["id"], 2);
    assert!(rifugi[0]["distance_km"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn test_nearby_limit_respected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let (status, body) = get_json(
        app,
        "/api/rifugi/nearby?lat=45.9095&lng=9.3745&max_km=200&limit=1",
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rifugi"].as_array().unwrap().len(), 1);
}
