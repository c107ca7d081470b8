//! Food Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{FoodItem, FoodItemUpsert};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppJson, AppResult, ok};

/// GET /api/food-items
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<FoodItem>>> {
    Ok(Json(state.catalog.list().await?))
}

/// PUT /api/food-items/:id
pub async fn upsert(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<FoodItemUpsert>,
) -> AppResult<Json<ApiResponse<FoodItem>>> {
    Ok(ok(state.catalog.upsert(&id, payload).await?))
}

/// DELETE /api/food-items/:id
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.remove_override(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
