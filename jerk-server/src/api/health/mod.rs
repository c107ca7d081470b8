//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 存活检查 + 存储模式 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "storeMode": "remote",
//!   "pendingSync": 2,
//!   "deadLetters": 0
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// remote | local
    store_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_sync: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dead_letters: Option<u64>,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let stats = match state.store.stats() {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read local store stats");
            None
        }
    };

    Json(HealthResponse {
        status: if stats.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store_mode: state.store.mode(),
        pending_sync: stats.as_ref().map(|s| s.pending_sync_count),
        dead_letters: stats.as_ref().map(|s| s.dead_letter_count),
    })
}
