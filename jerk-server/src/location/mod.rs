//! 位置模块 - 门店、配送区域与取餐位置校验

pub mod geo;
pub mod repository;
pub mod verifier;

pub use geo::{haversine_meters, validate_coordinates};
pub use repository::{DeliveryZoneRepository, LocationRepository};
pub use verifier::LocationVerifier;
