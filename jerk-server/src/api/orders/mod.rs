//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/stats", get(handler::stats))
        .route("/export", get(handler::export))
        .route("/archive", post(handler::archive))
        .route("/delete", post(handler::delete_many))
        .route("/scan", get(handler::scan))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/qr", get(handler::qr))
        .route("/{id}/check-in", post(handler::check_in))
        .route("/{id}/deliver", post(handler::deliver))
}
