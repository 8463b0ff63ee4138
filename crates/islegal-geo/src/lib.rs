//! # islegal-geo — Geospatial Search
//!
//! The nearest-better-jurisdiction finder and its supporting pieces:
//! centroid reference data, great-circle distance, approximate cache
//! cells, and the location-method ranking.
//!
//! ## Determinism
//!
//! Repeated calls with the same inputs return the identical candidate
//! and distance. Candidate sets are sorted by jurisdiction key before
//! scanning and the scan uses strict `<` comparison with an explicit
//! tie-break, so hash-map iteration order can never leak into results.
//!
//! Centroid tables are static reference data, parsed once on first use
//! and shared read-only across concurrent requests.

pub mod cell;
pub mod centroid;
pub mod distance;
pub mod location;
pub mod nearest;

pub use cell::{build_approx_cell, build_gps_cell};
pub use centroid::{centroid_for, country_centroid, us_state_centroid, Centroid};
pub use distance::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use location::{
    select_preferred_location, LocationCandidate, LocationMethod, LocationResolution,
};
pub use nearest::{nearest_better, NearestBetter, NearestCandidate};
