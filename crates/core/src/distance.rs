//! Great-circle distance between two coordinates.
//!
//! EU261 compensation tiers are keyed by great-circle distance, and the
//! regulation text itself uses the great-circle metric, so a spherical
//! haversine is the correct model here. The tier boundaries (1500 km,
//! 3500 km) carry enough margin that an ellipsoidal correction would
//! never flip a tier for a real route, so none is applied.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Mean Earth radius in kilometres (spherical approximation).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ---------------------------------------------------------------------------
// Haversine
// ---------------------------------------------------------------------------

/// Compute the great-circle distance in kilometres between two points
/// given as (latitude, longitude) pairs in decimal degrees.
///
/// Precondition: latitudes in `-90..=90`, longitudes in `-180..=180`.
/// Callers validate ranges at the ingestion edge (see
/// [`crate::airport::validate_coordinates`]); out-of-range input here is
/// a caller bug and the result is unspecified.
///
/// Always non-negative; identical coordinates yield exactly `0.0`.
pub fn haversine_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    if lat_a == lat_b && lon_a == lon_b {
        return 0.0;
    }

    let d_lat = (lat_b - lat_a).to_radians();
    let d_lon = (lon_b - lon_a).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Clamp guards against floating-point drift pushing sqrt input past 1.
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(0.0, 1.0).asin()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
