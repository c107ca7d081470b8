//! Input validation helpers
//!
//! Centralized text length constants and checks for payloads that are not
//! covered by `validator` derives (check-in form, partial updates).

use shared::error::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: location, zone, customer, driver
pub const MAX_NAME_LEN: usize = 200;

/// Order numbers as printed on the ticket
pub const MAX_ORDER_NUMBER_LEN: usize = 50;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound for any configured radius (50 km)
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Radius must be a finite positive number of meters
pub fn validate_radius(radius: f64) -> Result<(), AppError> {
    if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_METERS {
        return Err(AppError::with_message(
            ErrorCode::InvalidRadius,
            format!("Radius must be between 0 and {MAX_RADIUS_METERS} meters"),
        )
        .with_detail("radiusMeters", radius));
    }
    Ok(())
}
