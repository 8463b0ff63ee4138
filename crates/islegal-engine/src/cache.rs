//! # Result Cache
//!
//! Short-lived cache of previously computed answers, keyed by
//! jurisdiction plus approximate location cell.
//!
//! A lookup is a hit only when the entry is inside the freshness window
//! AND the freshly loaded profile's fingerprint matches the cached one
//! AND (for GPS-sourced entries) the cell has not changed. A hit
//! short-circuits profile re-resolution and the nearest-jurisdiction
//! search only — the caller still re-runs the verification freshness
//! check, so evidence that went stale while cached is still flagged.
//!
//! Entries are scanned most-recent-first and moved to the back on a hit;
//! the cache evicts from the front past capacity.

use serde::{Deserialize, Serialize};

use islegal_core::{ConfidenceLevel, JurisdictionKey, StatusLevel, Timestamp};
use islegal_geo::LocationMethod;

/// Freshness window in minutes.
pub const CACHE_WINDOW_MINUTES: i64 = 120;

/// Maximum number of retained entries.
pub const CACHE_CAPACITY: usize = 100;

/// One cached answer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the answer was computed.
    pub ts: Timestamp,
    /// Jurisdiction key.
    pub key: JurisdictionKey,
    /// ISO country code.
    pub country: String,
    /// Region code, if regional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Machine-readable status code.
    pub status_code: String,
    /// Traffic-light level.
    pub status_level: StatusLevel,
    /// Profile fingerprint at resolution time.
    pub profile_hash: String,
    /// Profile `verified_at` snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
    /// Location method behind the request.
    pub location_method: LocationMethod,
    /// Location confidence behind the request.
    pub location_confidence: ConfidenceLevel,
    /// Approximate location cell.
    pub approx_cell: String,
}

/// LRU cache of resolution answers.
#[derive(Debug)]
pub struct ResultCache {
    entries: Vec<CacheEntry>,
    window_minutes: i64,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// A cache with the default window and capacity.
    pub fn new() -> Self {
        Self::with_limits(CACHE_WINDOW_MINUTES, CACHE_CAPACITY)
    }

    /// A cache with explicit limits.
    pub fn with_limits(window_minutes: i64, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            window_minutes,
            capacity,
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an answer, replacing any previous entry for the same
    /// (key, cell) pair and evicting the oldest entries past capacity.
    pub fn record(&mut self, entry: CacheEntry) {
        self.entries
            .retain(|e| !(e.key == entry.key && e.approx_cell == entry.approx_cell));
        self.entries.push(entry);
        while self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    /// Look up a cached answer for (key, cell) against the freshly
    /// loaded profile's fingerprint.
    ///
    /// Returns the entry on a hit and moves it to the back. Any failing
    /// condition is a miss; a miss is not an error, it just forces full
    /// recomputation.
    pub fn lookup(
        &mut self,
        key: &JurisdictionKey,
        approx_cell: &str,
        current_hash: &str,
        now: Timestamp,
    ) -> Option<CacheEntry> {
        let position = self.entries.iter().rposition(|e| {
            e.key == *key && (e.location_method != LocationMethod::Gps || e.approx_cell == approx_cell)
        })?;

        let entry = &self.entries[position];
        if entry.ts.minutes_until(now) > self.window_minutes {
            return None;
        }
        if entry.profile_hash != current_hash {
            return None;
        }

        let entry = self.entries.remove(position);
        self.entries.push(entry);
        self.entries.last().cloned()
    }
}
