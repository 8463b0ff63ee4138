//! # Centroid Reference Data
//!
//! Static centroid tables for countries and US states, embedded at
//! compile time and parsed once on first use. After warm-up the tables
//! are read-only and safe to share across concurrent requests.
//!
//! The two tiers are kept separate: a nearest-jurisdiction search runs
//! over exactly one tier, never a mix of countries and states.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use islegal_core::JurisdictionKey;

use crate::distance::GeoPoint;

const COUNTRY_CENTROIDS: &str = include_str!("../data/country_centroids.json");
const US_STATE_CENTROIDS: &str = include_str!("../data/us_state_centroids.json");

/// A jurisdiction centroid with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Display name.
    pub name: String,
}

impl Centroid {
    /// The centroid as a bare point.
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

fn country_table() -> &'static BTreeMap<String, Centroid> {
    static TABLE: OnceLock<BTreeMap<String, Centroid>> = OnceLock::new();
    TABLE.get_or_init(|| parse_table(COUNTRY_CENTROIDS))
}

fn us_state_table() -> &'static BTreeMap<String, Centroid> {
    static TABLE: OnceLock<BTreeMap<String, Centroid>> = OnceLock::new();
    TABLE.get_or_init(|| parse_table(US_STATE_CENTROIDS))
}

// The embedded tables are build inputs; a parse failure is a build
// defect, not a runtime condition, so an empty table is the fallback.
fn parse_table(raw: &str) -> BTreeMap<String, Centroid> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Centroid for a country key (`DE`).
pub fn country_centroid(key: &JurisdictionKey) -> Option<&'static Centroid> {
    country_table().get(key.country())
}

/// Centroid for a US state key (`US-CO`).
pub fn us_state_centroid(key: &JurisdictionKey) -> Option<&'static Centroid> {
    us_state_table().get(key.as_str())
}

/// Centroid for any key, choosing the tier from its shape.
pub fn centroid_for(key: &JurisdictionKey) -> Option<&'static Centroid> {
    if key.is_regional() {
        us_state_centroid(key)
    } else {
        country_centroid(key)
    }
}
