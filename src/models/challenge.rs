// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Monthly challenge document.

use serde::{Deserialize, Serialize};

/// One document per calendar month in `monthly_challenges`,
/// keyed by `month_key` ("YYYY-MM").
///
/// Created lazily by the first access within a month. `reset_done` is a
/// one-shot latch: once the reset job has zeroed the monthly counters for
/// this month it flips to true and later invocations early-return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyChallenge {
    /// "YYYY-MM", also the document ID
    pub month_key: String,
    /// First instant of the month (ISO 8601)
    pub start_date: String,
    /// Last instant of the month (ISO 8601)
    pub end_date: String,
    /// Rifugi granting double points this month (empty on creation,
    /// curated out of band)
    #[serde(default)]
    pub bonus_rifugio_ids: Vec<u32>,
    /// Whether the monthly counter reset has run for this month
    #[serde(default)]
    pub reset_done: bool,
}

impl MonthlyChallenge {
    /// Fresh challenge for a month, with no bonus rifugi and the reset
    /// still pending.
    pub fn new(month_key: String, start_date: String, end_date: String) -> Self {
        Self {
            month_key,
            start_date,
            end_date,
            bonus_rifugio_ids: Vec::new(),
            reset_done: false,
        }
    }
}
