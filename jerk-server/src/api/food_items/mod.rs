//! Food Item API 模块
//!
//! 预设菜单 + 覆盖项；PUT 写入覆盖，DELETE 移除覆盖 (预设恢复)。

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/food-items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", put(handler::upsert).delete(handler::remove))
}
