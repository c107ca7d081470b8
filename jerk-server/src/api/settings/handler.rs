//! User Settings API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use shared::models::UserSettings;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppJson, AppResult, ok};

/// GET /api/settings/:email - 已保存的设置或默认值
pub async fn get(
    State(state): State<ServerState>,
    Path(email): Path<String>,
) -> AppResult<Json<UserSettings>> {
    Ok(Json(state.settings.get(&email).await?))
}

/// PUT /api/settings/:email - 深度合并
pub async fn update(
    State(state): State<ServerState>,
    Path(email): Path<String>,
    AppJson(patch): AppJson<Value>,
) -> AppResult<Json<ApiResponse<UserSettings>>> {
    Ok(ok(state.settings.update(&email, patch).await?))
}
