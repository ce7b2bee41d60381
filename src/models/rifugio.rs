// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Rifugio catalog entry model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Shelter category from the bundled catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum RifugioCategory {
    /// Staffed refuge with meals and beds
    Rifugio,
    /// Unstaffed emergency shelter
    Bivacco,
    /// Small hut, typically club-run
    Capanna,
}

/// Immutable catalog entry for a mountain refuge.
///
/// Loaded once at startup from the bundled dataset; never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rifugio {
    /// Catalog ID (also used in visit/saved document IDs)
    pub id: u32,
    /// Refuge name
    pub name: String,
    /// Place name (valley or massif)
    pub locality: String,
    /// Region name, if known
    pub region: Option<String>,
    /// Elevation in meters
    pub elevation_m: u32,
    /// WGS84 latitude
    pub latitude: f64,
    /// WGS84 longitude
    pub longitude: f64,
    /// Shelter category
    pub category: RifugioCategory,
    /// Optional free-text description
    pub description: Option<String>,
    /// Optional image URL
    pub image_url: Option<String>,
}
