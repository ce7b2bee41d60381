// SPDX-License-Identifier: MIT
// Copyright 2026 The Rifugio Tracker Authors

//! Rifugio catalog loading and lookup service.

use crate::models::{Rifugio, RifugioCategory};
use geo::{Distance, Haversine, Point};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Top-level shape of the bundled dataset.
#[derive(Deserialize)]
struct CatalogFile {
    rifugi: Vec<Rifugio>,
}

/// In-memory rifugio catalog, loaded once at startup and read-only after.
#[derive(Default, Clone, Debug)]
pub struct CatalogService {
    rifugi: Vec<Rifugio>,
    by_id: HashMap<u32, usize>,
}

impl CatalogService {
    /// Load the catalog from a bundled JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string with a top-level `rifugi` array.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let mut by_id = HashMap::with_capacity(file.rifugi.len());
        for (idx, rifugio) in file.rifugi.iter().enumerate() {
            if by_id.insert(rifugio.id, idx).is_some() {
                return Err(CatalogError::DuplicateId(rifugio.id));
            }
        }

        tracing::info!(count = file.rifugi.len(), "Loaded rifugio catalog");
        Ok(Self {
            rifugi: file.rifugi,
            by_id,
        })
    }

    /// All catalog entries, in file order.
    pub fn rifugi(&self) -> &[Rifugio] {
        &self.rifugi
    }

    /// Look up a rifugio by catalog id.
    pub fn get(&self, id: u32) -> Option<&Rifugio> {
        self.by_id.get(&id).map(|&idx| &self.rifugi[idx])
    }

    /// Entries of a given category, in file order.
    pub fn by_category(&self, category: RifugioCategory) -> Vec<&Rifugio> {
        self.rifugi
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Rifugi within `max_km` of a point, nearest first, capped at `limit`.
    pub fn nearby(&self, latitude: f64, longitude: f64, max_km: f64, limit: usize) -> Vec<(&Rifugio, f64)> {
        let origin = Point::new(longitude, latitude);
        let mut hits: Vec<(&Rifugio, f64)> = self
            .rifugi
            .iter()
            .map(|r| {
                let km = Haversine.distance(origin, Point::new(r.longitude, r.latitude)) / 1000.0;
                (r, km)
            })
            .filter(|(_, km)| *km <= max_km)
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(limit);
        hits
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Duplicate rifugio id in catalog: {0}")]
    DuplicateId(u32),
}
