//! Location & Delivery Zone Models
//!
//! 门店位置用于取餐位置校验 (半径判定)，配送区域仅用于标注。

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

fn default_radius() -> f64 {
    DEFAULT_RADIUS_METERS
}

fn default_true() -> bool {
    true
}

/// Business location entity (门店)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius_meters: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Create location payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
}

/// Update location payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
}

/// Delivery zone entity (配送区域)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub id: String,
    pub name: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub radius_meters: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Create delivery zone payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZoneCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub center_latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub center_longitude: f64,
    pub radius_meters: f64,
    pub is_active: Option<bool>,
}

/// Update delivery zone payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZoneUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub center_latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub center_longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
}

/// Device position submitted for verification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

/// Outcome of a one-shot radius check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_zone_id: Option<String>,
    pub message: String,
}

/// Verification snapshot stored on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    pub verified_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_zone_id: Option<String>,
}

impl LocationSnapshot {
    pub fn from_result(req: &VerificationRequest, result: &VerificationResult, at: i64) -> Self {
        Self {
            latitude: req.latitude,
            longitude: req.longitude,
            accuracy_meters: req.accuracy_meters,
            verified_at: at,
            location_id: result.location_id.clone(),
            location_name: result.location_name.clone(),
            distance_meters: result.distance_meters,
            delivery_zone_id: result.delivery_zone_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults() {
        let loc: Location = serde_json::from_str(
            r#"{"id":"l1","name":"Main","latitude":40.0,"longitude":-74.0}"#,
        )
        .unwrap();
        assert_eq!(loc.radius_meters, DEFAULT_RADIUS_METERS);
        assert!(loc.is_active);
        assert!(loc.address.is_none());
    }

    #[test]
    fn test_location_create_rejects_out_of_range() {
        let create = LocationCreate {
            name: "Main".into(),
            address: None,
            latitude: 91.0,
            longitude: 0.0,
            radius_meters: None,
            is_active: None,
        };
        assert!(create.validate().is_err());
    }
}
