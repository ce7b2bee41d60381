// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Scoring properties over the full elevation range.

use rifugio_tracker::services::scoring;

#[test]
fn base_points_is_floor_of_hundredths() {
    for e in 0..5000u32 {
        assert_eq!(scoring::base_points(e), e / 100);
    }
}

#[test]
fn base_points_is_monotone() {
    let mut last = 0;
    for e in 0..5000u32 {
        let p = scoring::base_points(e);
        assert!(p >= last);
        last = p;
    }
}

#[test]
fn bonus_rifugi_earn_exactly_double() {
    for e in [0u32, 99, 1498, 2500, 3375, 4554] {
        for id in 1..=30u32 {
            let expected = if scoring::is_bonus_rifugio(id) {
                2 * scoring::base_points(e)
            } else {
                scoring::base_points(e)
            };
            assert_eq!(scoring::total_points(id, e), expected);
        }
    }
}

#[test]
fn reason_matches_award_priority() {
    // Bonus beats altitude, altitude thresholds are checked high to low
    assert_eq!(scoring::visit_reason(1, 3500), scoring::REASON_BONUS);
    assert_eq!(
        scoring::visit_reason(2, 3000),
        scoring::REASON_EXTREME_ALTITUDE
    );
    assert_eq!(
        scoring::visit_reason(2, 2500),
        scoring::REASON_HIGH_ALTITUDE
    );
    assert_eq!(scoring::visit_reason(2, 2499), scoring::REASON_STANDARD);
}

#[test]
fn pinned_scenarios() {
    // Capanna Margherita: 3375 m, not a bonus rifugio
    let high = scoring::score_visit(11, 3375);
    assert_eq!(high.points, 33);
    assert_eq!(high.reason, "Alta quota - Sfida estrema");

    // Rifugio Porta: 1498 m, historic bonus rifugio
    let bonus = scoring::score_visit(1, 1498);
    assert_eq!(bonus.points, 28);
    assert_eq!(bonus.reason, "Rifugio storico/speciale - Punti doppi!");
}
