// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn auth_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_invalid_visit_cursor() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let response = app
        .oneshot(auth_get("/api/visits?cursor=@@@@", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_leaderboard_scope() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let response = app
        .oneshot(auth_get("/api/leaderboard?scope=weekly", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_catalog_category() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let response = app
        .oneshot(auth_get("/api/rifugi?category=albergo", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nearby_rejects_out_of_range_coordinates() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let response = app
        .oneshot(auth_get("/api/rifugi/nearby?lat=120.0&lng=9.3", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_rating_out_of_range() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let body = serde_json::json!({ "rating": 6, "comment": "bella vista" });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rifugi/1/reviews")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_for_unknown_rifugio() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let body = serde_json::json!({ "rating": 4, "comment": "" });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rifugi/999/reviews")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_friend_request_to_self_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let body = serde_json::json!({ "to_user_id": "user-a" });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/friends/requests")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visit_unknown_rifugio() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-a", &state.config.jwt_signing_key);

    let body = serde_json::json!({ "rifugio_id": 999 });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
