//! Delivery Zone API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{DeliveryZone, DeliveryZoneCreate, DeliveryZoneUpdate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppJson, AppResult, ok};

/// GET /api/delivery-zones
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DeliveryZone>>> {
    Ok(Json(state.zones.find_all().await?))
}

/// GET /api/delivery-zones/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryZone>> {
    let zone = state.zones.find_by_id(&id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::DeliveryZoneNotFound,
            format!("Delivery zone {id} not found"),
        )
    })?;
    Ok(Json(zone))
}

/// POST /api/delivery-zones
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<DeliveryZoneCreate>,
) -> AppResult<Json<ApiResponse<DeliveryZone>>> {
    Ok(ok(state.zones.create(payload).await?))
}

/// PUT /api/delivery-zones/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<DeliveryZoneUpdate>,
) -> AppResult<Json<ApiResponse<DeliveryZone>>> {
    Ok(ok(state.zones.update(&id, payload).await?))
}

/// DELETE /api/delivery-zones/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.zones.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
