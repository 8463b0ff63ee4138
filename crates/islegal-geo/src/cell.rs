//! # Approximate Cells
//!
//! Coarse spatial buckets used to scope cache validity. GPS coordinates
//! quantize to a two-decimal grid (roughly 1 km at the equator); other
//! location methods degenerate to the region or country string.

use crate::location::LocationMethod;

/// Quantize GPS coordinates to a cache cell, e.g. `cell:31.97,-99.90`.
pub fn build_gps_cell(lat: f64, lon: f64) -> String {
    format!("cell:{lat:.2},{lon:.2}")
}

/// The approximate cell for a resolution.
///
/// GPS-sourced requests use the quantized coordinate cell; everything
/// else falls back to `adm1:CC-RR` when a region is present, otherwise
/// `country:CC`.
pub fn build_approx_cell(
    method: LocationMethod,
    country: &str,
    region: Option<&str>,
    gps_cell: Option<&str>,
) -> String {
    if method == LocationMethod::Gps {
        if let Some(cell) = gps_cell {
            return cell.to_string();
        }
    }
    match region {
        Some(region) => format!("adm1:{country}-{region}"),
        None => format!("country:{country}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_cell_quantization() {
        assert_eq!(build_gps_cell(31.9686, -99.9018), "cell:31.97,-99.90");
        assert_eq!(build_gps_cell(0.0, 0.0), "cell:0.00,0.00");
    }

    #[test]
    fn test_nearby_points_share_a_cell() {
        assert_eq!(
            build_gps_cell(52.5201, 13.4049),
            build_gps_cell(52.5203, 13.4051)
        );
    }

    #[test]
    fn test_gps_method_uses_cell() {
        let cell = build_gps_cell(31.97, -99.90);
        assert_eq!(
            build_approx_cell(LocationMethod::Gps, "US", Some("TX"), Some(&cell)),
            "cell:31.97,-99.90"
        );
    }

    #[test]
    fn test_gps_without_cell_falls_back() {
        assert_eq!(
            build_approx_cell(LocationMethod::Gps, "US", Some("TX"), None),
            "adm1:US-TX"
        );
    }

    #[test]
    fn test_non_gps_methods() {
        assert_eq!(
            build_approx_cell(LocationMethod::Manual, "US", Some("CO"), None),
            "adm1:US-CO"
        );
        assert_eq!(
            build_approx_cell(LocationMethod::Ip, "DE", None, None),
            "country:DE"
        );
    }
}
