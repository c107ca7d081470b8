//! Great-circle distance helpers

use shared::error::{AppError, ErrorCode};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two WGS84 points, in meters
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Reject non-finite or out-of-range coordinates
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    let ok = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if ok {
        return Ok(());
    }
    Err(AppError::with_message(
        ErrorCode::InvalidCoordinates,
        "Latitude must be within [-90, 90] and longitude within [-180, 180]",
    )
    .with_detail("latitude", latitude)
    .with_detail("longitude", longitude))
}
