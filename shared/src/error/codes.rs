//! Unified error codes for the JERK tracker
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Location errors
//! - 8xxx: Settings errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a plain u16 so the dashboard can switch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Another order already uses this order number
    OrderNumberExists = 4002,
    /// Requested status change is not allowed from the current status
    InvalidStatusTransition = 4003,
    /// Order is archived and can no longer change
    OrderArchived = 4004,
    /// Driver name is missing
    DriverNameRequired = 4005,
    /// Driver company missing or not in the supported list
    DriverCompanyInvalid = 4006,
    /// Neither menu items nor free-text details were given
    OrderDetailsRequired = 4007,

    // ==================== 6xxx: Catalog ====================
    /// Food item not found
    FoodItemNotFound = 6001,
    /// Food item has invalid price
    FoodItemInvalidPrice = 6002,
    /// Food item is marked unavailable
    FoodItemUnavailable = 6003,

    // ==================== 7xxx: Location ====================
    /// Business location not found
    LocationNotFound = 7001,
    /// Delivery zone not found
    DeliveryZoneNotFound = 7002,
    /// Latitude/longitude out of range or not finite
    InvalidCoordinates = 7003,
    /// Device is not within range of any business location
    LocationVerificationFailed = 7004,
    /// Radius must be positive
    InvalidRadius = 7005,

    // ==================== 8xxx: Settings ====================
    /// Settings key is not a usable email address
    InvalidEmail = 8001,
    /// Settings payload could not be merged into a valid settings bag
    SettingsInvalid = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Remote store unreachable or returned an error
    RemoteStoreUnavailable = 9101,

    // ==================== 94xx: Storage ====================
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
    /// System busy (IO error, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNumberExists => "Order number already exists",
            ErrorCode::InvalidStatusTransition => "Order status cannot change this way",
            ErrorCode::OrderArchived => "Order is archived",
            ErrorCode::DriverNameRequired => "Driver name is required",
            ErrorCode::DriverCompanyInvalid => "Please select a delivery company",
            ErrorCode::OrderDetailsRequired => "Select menu items or enter order details",

            // Catalog
            ErrorCode::FoodItemNotFound => "Food item not found",
            ErrorCode::FoodItemInvalidPrice => "Food item has invalid price",
            ErrorCode::FoodItemUnavailable => "Food item is not available",

            // Location
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::DeliveryZoneNotFound => "Delivery zone not found",
            ErrorCode::InvalidCoordinates => "Invalid coordinates",
            ErrorCode::LocationVerificationFailed => "Location verification failed",
            ErrorCode::InvalidRadius => "Radius must be greater than zero",

            // Settings
            ErrorCode::InvalidEmail => "Invalid email address",
            ErrorCode::SettingsInvalid => "Invalid settings",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::RemoteStoreUnavailable => "Remote store unavailable",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderNumberExists),
            4003 => Ok(ErrorCode::InvalidStatusTransition),
            4004 => Ok(ErrorCode::OrderArchived),
            4005 => Ok(ErrorCode::DriverNameRequired),
            4006 => Ok(ErrorCode::DriverCompanyInvalid),
            4007 => Ok(ErrorCode::OrderDetailsRequired),

            // Catalog
            6001 => Ok(ErrorCode::FoodItemNotFound),
            6002 => Ok(ErrorCode::FoodItemInvalidPrice),
            6003 => Ok(ErrorCode::FoodItemUnavailable),

            // Location
            7001 => Ok(ErrorCode::LocationNotFound),
            7002 => Ok(ErrorCode::DeliveryZoneNotFound),
            7003 => Ok(ErrorCode::InvalidCoordinates),
            7004 => Ok(ErrorCode::LocationVerificationFailed),
            7005 => Ok(ErrorCode::InvalidRadius),

            // Settings
            8001 => Ok(ErrorCode::InvalidEmail),
            8002 => Ok(ErrorCode::SettingsInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::RemoteStoreUnavailable),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
