//! # Location Resolution
//!
//! Pure ranking of location-estimation methods into a single
//! `LocationResolution`. Manual entry is always preferred, then GPS,
//! then IP. No I/O happens here; the caller supplies whatever candidate
//! estimates it has.

use serde::{Deserialize, Serialize};

use islegal_core::ConfidenceLevel;

/// How a location estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMethod {
    /// User-entered jurisdiction.
    Manual,
    /// Device GPS fix.
    Gps,
    /// IP geolocation.
    Ip,
}

/// A candidate location estimate from one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    /// ISO country code.
    pub country: String,
    /// Region code, if resolved.
    pub region: Option<String>,
    /// Whether the fix is coarse (wide GPS accuracy radius). Only
    /// meaningful for GPS candidates.
    #[serde(default)]
    pub coarse: bool,
}

/// The ranked location answer attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResolution {
    /// Winning method.
    pub method: LocationMethod,
    /// Confidence in the estimate.
    pub confidence: ConfidenceLevel,
    /// Explanatory note ("IP estimate differs; using GPS.").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LocationResolution {
    /// The approximation hint shown with low-trust estimates.
    pub fn approximate_hint(&self) -> Option<&'static str> {
        if self.method == LocationMethod::Ip || self.confidence != ConfidenceLevel::High {
            Some("Location may be approximate")
        } else {
            None
        }
    }
}

/// Rank the available candidates: manual > gps > ip.
///
/// Manual entry resolves with medium confidence. GPS resolves with high
/// confidence unless the fix is coarse, which downgrades to medium and
/// attaches the approximation hint via [`LocationResolution::approximate_hint`].
/// When GPS and IP disagree on country or region, GPS wins and a note
/// explains the mismatch. IP alone is always low confidence.
pub fn select_preferred_location(
    manual: Option<&LocationCandidate>,
    gps: Option<&LocationCandidate>,
    ip: Option<&LocationCandidate>,
) -> Option<LocationResolution> {
    if manual.is_some() {
        return Some(LocationResolution {
            method: LocationMethod::Manual,
            confidence: ConfidenceLevel::Medium,
            note: None,
        });
    }

    if let Some(gps) = gps {
        let mismatch = ip.map(|ip| ip.country != gps.country || ip.region != gps.region);
        let note = match mismatch {
            Some(true) => Some("IP estimate differs; using GPS.".to_string()),
            _ => None,
        };
        let confidence = if gps.coarse {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        };
        return Some(LocationResolution {
            method: LocationMethod::Gps,
            confidence,
            note,
        });
    }

    ip.map(|_| LocationResolution {
        method: LocationMethod::Ip,
        confidence: ConfidenceLevel::Low,
        note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(country: &str, region: Option<&str>) -> LocationCandidate {
        LocationCandidate {
            country: country.into(),
            region: region.map(str::to_string),
            coarse: false,
        }
    }

    #[test]
    fn test_manual_always_wins() {
        let manual = candidate("DE", None);
        let gps = candidate("FR", None);
        let resolved = select_preferred_location(Some(&manual), Some(&gps), None).unwrap();
        assert_eq!(resolved.method, LocationMethod::Manual);
        assert_eq!(resolved.confidence, ConfidenceLevel::Medium);
        assert!(resolved.note.is_none());
    }

    #[test]
    fn test_gps_beats_ip() {
        let gps = candidate("US", Some("CO"));
        let ip = candidate("US", Some("CO"));
        let resolved = select_preferred_location(None, Some(&gps), Some(&ip)).unwrap();
        assert_eq!(resolved.method, LocationMethod::Gps);
        assert_eq!(resolved.confidence, ConfidenceLevel::High);
        assert!(resolved.note.is_none());
        assert!(resolved.approximate_hint().is_none());
    }

    #[test]
    fn test_gps_ip_mismatch_attaches_note() {
        let gps = candidate("US", Some("CO"));
        let ip = candidate("US", Some("WY"));
        let resolved = select_preferred_location(None, Some(&gps), Some(&ip)).unwrap();
        assert_eq!(resolved.method, LocationMethod::Gps);
        assert_eq!(
            resolved.note.as_deref(),
            Some("IP estimate differs; using GPS.")
        );
    }

    #[test]
    fn test_coarse_gps_downgraded() {
        let mut gps = candidate("US", Some("CO"));
        gps.coarse = true;
        let resolved = select_preferred_location(None, Some(&gps), None).unwrap();
        assert_eq!(resolved.confidence, ConfidenceLevel::Medium);
        assert_eq!(
            resolved.approximate_hint(),
            Some("Location may be approximate")
        );
    }

    #[test]
    fn test_ip_alone_is_low_and_approximate() {
        let ip = candidate("DE", None);
        let resolved = select_preferred_location(None, None, Some(&ip)).unwrap();
        assert_eq!(resolved.method, LocationMethod::Ip);
        assert_eq!(resolved.confidence, ConfidenceLevel::Low);
        assert_eq!(
            resolved.approximate_hint(),
            Some("Location may be approximate")
        );
    }

    #[test]
    fn test_nothing_resolves_to_none() {
        assert!(select_preferred_location(None, None, None).is_none());
    }
}
