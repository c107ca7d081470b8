//! Location verification - 单次半径判定
//!
//! 设备坐标与所有启用门店逐一比较 (haversine)，
//! 命中任一门店半径即通过；同时标注所在的配送区域。

use shared::error::AppResult;
use shared::models::{DeliveryZone, Location, VerificationRequest, VerificationResult};

use super::geo::{haversine_meters, validate_coordinates};
use super::repository::{DeliveryZoneRepository, LocationRepository};

pub const NO_LOCATIONS_MESSAGE: &str = "No business locations configured";

/// Evaluate a position against the configured locations and zones
///
/// Inactive locations and zones are ignored. When several locations accept
/// the point the closest one is reported; when none does, the closest
/// location overall is reported with its distance.
pub fn evaluate(
    req: &VerificationRequest,
    locations: &[Location],
    zones: &[DeliveryZone],
) -> VerificationResult {
    let delivery_zone_id = zones
        .iter()
        .filter(|z| z.is_active)
        .map(|z| {
            let d = haversine_meters(req.latitude, req.longitude, z.center_latitude, z.center_longitude);
            (z, d)
        })
        .filter(|(z, d)| *d <= z.radius_meters)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(z, _)| z.id.clone());

    let measured: Vec<(&Location, f64)> = locations
        .iter()
        .filter(|l| l.is_active)
        .map(|l| (l, haversine_meters(req.latitude, req.longitude, l.latitude, l.longitude)))
        .collect();

    let nearest = measured.iter().copied().min_by(|a, b| a.1.total_cmp(&b.1));
    let Some(nearest) = nearest else {
        return VerificationResult {
            is_valid: false,
            distance_meters: None,
            location_id: None,
            location_name: None,
            delivery_zone_id,
            message: NO_LOCATIONS_MESSAGE.to_string(),
        };
    };

    let accepted = measured
        .iter()
        .copied()
        .filter(|(l, d)| *d <= l.radius_meters)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let ((location, distance), is_valid) = match accepted {
        Some(hit) => (hit, true),
        None => (nearest, false),
    };

    let message = if is_valid {
        format!("Verified at {} ({:.0}m away)", location.name, distance)
    } else {
        format!(
            "Too far from {} ({:.0}m away, must be within {:.0}m)",
            location.name, distance, location.radius_meters
        )
    };

    VerificationResult {
        is_valid,
        distance_meters: Some(distance),
        location_id: Some(location.id.clone()),
        location_name: Some(location.name.clone()),
        delivery_zone_id,
        message,
    }
}

/// Verifies device positions against the stored locations and zones
#[derive(Debug, Clone)]
pub struct LocationVerifier {
    locations: LocationRepository,
    zones: DeliveryZoneRepository,
}

impl LocationVerifier {
    pub fn new(locations: LocationRepository, zones: DeliveryZoneRepository) -> Self {
        Self { locations, zones }
    }

    pub async fn verify(&self, req: &VerificationRequest) -> AppResult<VerificationResult> {
        validate_coordinates(req.latitude, req.longitude)?;

        let locations = self.locations.find_all().await?;
        let zones = self.zones.find_all().await?;
        let result = evaluate(req, &locations, &zones);

        tracing::debug!(
            is_valid = result.is_valid,
            location_id = ?result.location_id,
            distance_meters = ?result.distance_meters,
            "Location verified"
        );
        Ok(result)
    }
}
