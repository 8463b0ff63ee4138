//! # Nearest-Better-Jurisdiction Search
//!
//! Finds the geographically nearest candidate whose status level is
//! strictly better than the current one, on the ordering
//! `red(0) < yellow(1) < green(2)`. `gray` candidates never qualify and
//! a `green` current level short-circuits to no result.
//!
//! Candidates are sorted by key before the scan and the scan keeps a
//! strict `<` on distance with an explicit tie-break (more sources wins
//! within floating-point tolerance), so the result is reproducible
//! regardless of the caller's collection order.

use serde::{Deserialize, Serialize};

use islegal_core::{JurisdictionKey, StatusLevel};

use crate::distance::{haversine_km, GeoPoint};

/// Distances within this tolerance (km) count as equidistant.
const DISTANCE_TOLERANCE_KM: f64 = 1e-9;

/// A candidate jurisdiction for the nearest-better search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestCandidate {
    /// Jurisdiction key.
    pub key: JurisdictionKey,
    /// Resolved status level.
    pub level: StatusLevel,
    /// Centroid.
    pub point: GeoPoint,
    /// Number of citable sources; equidistant tie-break prefers more.
    pub sources_count: usize,
}

/// The nearest strictly-better jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestBetter {
    /// Jurisdiction key of the winner.
    pub key: JurisdictionKey,
    /// Great-circle distance from the current centroid, km.
    pub distance_km: f64,
}

/// Find the nearest candidate strictly better than `current_level`.
///
/// Returns `None` when the current level is already `green` (or has no
/// rank) or when no candidate qualifies. The caller supplies candidates
/// of a single tier — country-level or US-state-level, never mixed.
pub fn nearest_better(
    current_level: StatusLevel,
    current_point: GeoPoint,
    candidates: &[NearestCandidate],
) -> Option<NearestBetter> {
    let current_rank = current_level.rank()?;
    if current_rank == 2 {
        return None;
    }

    let mut qualifying: Vec<&NearestCandidate> = candidates
        .iter()
        .filter(|c| c.level.is_strictly_better_than(current_level))
        .collect();
    qualifying.sort_by(|a, b| a.key.cmp(&b.key));

    let mut best: Option<(&NearestCandidate, f64)> = None;
    for candidate in qualifying {
        let distance = haversine_km(current_point, candidate.point);
        best = match best {
            None => Some((candidate, distance)),
            Some((held, held_distance)) => {
                if (distance - held_distance).abs() <= DISTANCE_TOLERANCE_KM {
                    // Equidistant: prefer the candidate with more sources.
                    if candidate.sources_count > held.sources_count {
                        Some((candidate, distance))
                    } else {
                        Some((held, held_distance))
                    }
                } else if distance < held_distance {
                    Some((candidate, distance))
                } else {
                    Some((held, held_distance))
                }
            }
        };
    }

    best.map(|(candidate, distance_km)| NearestBetter {
        key: candidate.key.clone(),
        distance_km,
    })
}
