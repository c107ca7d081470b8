//! Orders manager error types

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, VerificationResult};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order number already exists: {0}")]
    OrderNumberExists(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is archived: {0}")]
    OrderArchived(String),

    #[error("Driver name is required")]
    DriverNameRequired,

    #[error("Unknown driver company: {0}")]
    DriverCompanyInvalid(String),

    #[error("Order details or items are required")]
    OrderDetailsRequired,

    #[error("Food item not found: {0}")]
    FoodItemNotFound(String),

    #[error("Food item is not available: {0}")]
    FoodItemUnavailable(String),

    #[error("Location verification failed: {}", .0.message)]
    VerificationFailed(VerificationResult),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Store(e) => e.into(),
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {id}"))
                    .with_detail("id", id)
            }
            ManagerError::OrderNumberExists(number) => AppError::with_message(
                ErrorCode::OrderNumberExists,
                format!("Order number already exists: {number}"),
            )
            .with_detail("orderNumber", number),
            ManagerError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot move order from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
            ManagerError::OrderArchived(id) => {
                AppError::with_message(ErrorCode::OrderArchived, format!("Order is archived: {id}"))
                    .with_detail("id", id)
            }
            ManagerError::DriverNameRequired => AppError::new(ErrorCode::DriverNameRequired),
            ManagerError::DriverCompanyInvalid(value) => AppError::with_message(
                ErrorCode::DriverCompanyInvalid,
                if value.is_empty() {
                    "Driver company is required".to_string()
                } else {
                    format!("Unknown driver company: {value}")
                },
            )
            .with_detail("driverCompany", value),
            ManagerError::OrderDetailsRequired => AppError::new(ErrorCode::OrderDetailsRequired),
            ManagerError::FoodItemNotFound(id) => AppError::with_message(
                ErrorCode::FoodItemNotFound,
                format!("Food item not found: {id}"),
            )
            .with_detail("foodItemId", id),
            ManagerError::FoodItemUnavailable(id) => AppError::with_message(
                ErrorCode::FoodItemUnavailable,
                format!("Food item is not available: {id}"),
            )
            .with_detail("foodItemId", id),
            ManagerError::VerificationFailed(result) => {
                let message = result.message.clone();
                let verification = serde_json::to_value(&result).unwrap_or(Value::Null);
                AppError::with_message(ErrorCode::LocationVerificationFailed, message)
                    .with_detail("verification", verification)
            }
            ManagerError::App(e) => e,
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_codes_and_statuses() {
        let err: AppError = ManagerError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::PickedUp,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = ManagerError::DriverCompanyInvalid(String::new()).into();
        assert_eq!(err.code, ErrorCode::DriverCompanyInvalid);
        assert_eq!(err.message, "Driver company is required");

        let err: AppError = ManagerError::OrderNotFound("x".into()).into();
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);

        let err: AppError = ManagerError::FoodItemUnavailable("oxtail".into()).into();
        assert_eq!(err.code, ErrorCode::FoodItemUnavailable);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_verification_failure_carries_result() {
        let result = VerificationResult {
            is_valid: false,
            distance_meters: Some(812.0),
            location_id: Some("l1".into()),
            location_name: Some("Main".into()),
            delivery_zone_id: None,
            message: "Too far from Main (812m away, must be within 100m)".into(),
        };
        let err: AppError = ManagerError::VerificationFailed(result).into();
        assert_eq!(err.code, ErrorCode::LocationVerificationFailed);
        assert_eq!(err.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.details.unwrap();
        assert_eq!(details["verification"]["isValid"], false);
        assert_eq!(details["verification"]["locationId"], "l1");
    }
}
