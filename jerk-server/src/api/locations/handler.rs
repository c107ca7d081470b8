//! Location API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{
    Location, LocationCreate, LocationUpdate, VerificationRequest, VerificationResult,
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppJson, AppResult, ok};

/// GET /api/locations - 所有门店
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Location>>> {
    Ok(Json(state.locations.find_all().await?))
}

/// GET /api/locations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Location>> {
    let location = state.locations.find_by_id(&id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::LocationNotFound, format!("Location {id} not found"))
    })?;
    Ok(Json(location))
}

/// POST /api/locations
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<LocationCreate>,
) -> AppResult<Json<ApiResponse<Location>>> {
    Ok(ok(state.locations.create(payload).await?))
}

/// PUT /api/locations/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<LocationUpdate>,
) -> AppResult<Json<ApiResponse<Location>>> {
    Ok(ok(state.locations.update(&id, payload).await?))
}

/// DELETE /api/locations/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.locations.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/locations/verify - 单独的位置校验
pub async fn verify(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<VerificationRequest>,
) -> AppResult<Json<VerificationResult>> {
    Ok(Json(state.verifier.verify(&payload).await?))
}
