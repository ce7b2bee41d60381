// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Monthly reset job tests against the Firestore emulator.

use rifugio_tracker::models::UserPointsStats;
use rifugio_tracker::services::monthly;

mod common;

fn seeded_stats(user_id: &str) -> UserPointsStats {
    UserPointsStats {
        user_id: user_id.to_string(),
        total_points: 120,
        total_visits: 6,
        monthly_points: 45,
        monthly_visits: 3,
        last_updated: "2026-01-20T10:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn test_challenge_created_lazily_with_reset_pending() {
    require_emulator!();
    let db = common::test_db().await;

    // Use a synthetic far-future month so other tests can't have touched it
    let now = chrono::DateTime::parse_from_rfc3339("2044-06-10T12:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let challenge = monthly::get_or_create_challenge(&db, now).await.unwrap();
    assert_eq!(challenge.month_key, "2044-06");
    assert_eq!(challenge.start_date, "2044-06-01T00:00:00Z");
    assert_eq!(challenge.end_date, "2044-06-30T23:59:59Z");
    assert!(challenge.bonus_rifugio_ids.is_empty());
    assert!(!challenge.reset_done);
}

#[tokio::test]
async fn test_reset_zeroes_monthly_fields_and_latches() {
    require_emulator!();
    let db = common::test_db().await;

    let user_id = format!("reset-{}", chrono::Utc::now().timestamp_micros());
    db.set_user_points_stats(&user_id, &seeded_stats(&user_id))
        .await
        .unwrap();

    let now = chrono::DateTime::parse_from_rfc3339("2045-02-01T00:05:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let outcome = monthly::run_monthly_reset(&db, now).await.unwrap();
    assert!(!outcome.already_done);
    assert!(outcome.stats_zeroed >= 1);

    let stats = db.get_user_points_stats(&user_id).await.unwrap().unwrap();
    assert_eq!(stats.monthly_points, 0);
    assert_eq!(stats.monthly_visits, 0);
    // Lifetime totals survive
    assert_eq!(stats.total_points, 120);
    assert_eq!(stats.total_visits, 6);

    let challenge = db.get_monthly_challenge("2045-02").await.unwrap().unwrap();
    assert!(challenge.reset_done);
}

#[tokio::test]
async fn test_second_reset_in_same_month_is_a_noop() {
    require_emulator!();
    let db = common::test_db().await;

    let now = chrono::DateTime::parse_from_rfc3339("2046-03-01T00:05:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let first = monthly::run_monthly_reset(&db, now).await.unwrap();
    assert!(!first.already_done);

    // Seed counters after the first reset; a second run must not touch them
    let user_id = format!("noop-{}", chrono::Utc::now().timestamp_micros());
    db.set_user_points_stats(&user_id, &seeded_stats(&user_id))
        .await
        .unwrap();

    let second = monthly::run_monthly_reset(&db, now).await.unwrap();
    assert!(second.already_done);
    assert_eq!(second.stats_zeroed, 0);

    let stats = db.get_user_points_stats(&user_id).await.unwrap().unwrap();
    assert_eq!(stats.monthly_points, 45);
}

#[tokio::test]
async fn test_resets_in_distinct_months_are_independent() {
    require_emulator!();
    let db = common::test_db().await;

    let march = chrono::DateTime::parse_from_rfc3339("2047-03-15T12:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let april = chrono::DateTime::parse_from_rfc3339("2047-04-01T00:05:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    // An April-keyed reset latches 2047-04 and leaves 2047-03 untouched
    monthly::run_monthly_reset(&db, april).await.unwrap();

    let march_challenge = monthly::get_or_create_challenge(&db, march).await.unwrap();
    assert_eq!(march_challenge.month_key, "2047-03");
    assert!(!march_challenge.reset_done);

    let april_challenge = db.get_monthly_challenge("2047-04").await.unwrap().unwrap();
    assert!(april_challenge.reset_done);
}
