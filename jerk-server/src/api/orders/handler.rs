//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use http::{StatusCode, header};
use shared::models::{
    BulkOrderIds, BulkResult, CheckInRequest, Order, OrderCreate, OrderQr, OrderQuery, OrderStats,
    OrderWithQr,
};

use crate::core::ServerState;
use crate::orders::export::{export_filename, orders_to_csv};
use crate::orders::qr::parse_order_url;
use crate::utils::{ApiResponse, AppError, AppJson, AppResult, ok, ok_with_message};

#[derive(Debug, serde::Deserialize)]
pub struct ScanQuery {
    pub url: String,
}

/// GET /api/orders - 订单列表 (`?status=&includeArchived=`)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list(&query).await?;
    Ok(Json(orders))
}

/// POST /api/orders - 创建订单 (位置校验通过后才会写入)
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<Json<ApiResponse<OrderWithQr>>> {
    let created = state.orders.create_order(payload).await?;
    Ok(ok_with_message(created, "Order created"))
}

/// GET /api/orders/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<OrderStats>> {
    Ok(Json(state.orders.stats().await?))
}

/// GET /api/orders/export - CSV 下载，过滤条件同列表
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Response> {
    let orders = state.orders.list(&query).await?;
    let csv = orders_to_csv(&orders);
    let filename = export_filename(shared::util::now_millis());
    tracing::info!(rows = orders.len(), filename = %filename, "Orders exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/orders/archive - 批量归档
pub async fn archive(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<BulkOrderIds>,
) -> AppResult<Json<ApiResponse<BulkResult>>> {
    let affected = state.orders.archive_many(&payload.ids).await?;
    Ok(ok(BulkResult { affected }))
}

/// POST /api/orders/delete - 批量删除
pub async fn delete_many(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<BulkOrderIds>,
) -> AppResult<Json<ApiResponse<BulkResult>>> {
    let affected = state.orders.delete_many(&payload.ids).await?;
    Ok(ok(BulkResult { affected }))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(&id).await?))
}

/// GET /api/orders/:id/qr - 二维码链接
pub async fn qr(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderQr>> {
    let order = state.orders.get(&id).await?;
    let url = state.orders.qr_url(&order.id)?;
    Ok(Json(OrderQr {
        order_id: order.id,
        url,
    }))
}

/// GET /api/orders/scan?url= - 扫码后解析订单
pub async fn scan(
    State(state): State<ServerState>,
    Query(query): Query<ScanQuery>,
) -> AppResult<Json<Order>> {
    let id = parse_order_url(&query.url)
        .ok_or_else(|| AppError::invalid_request(format!("Not an order link: {}", query.url)))?;
    Ok(Json(state.orders.get(&id).await?))
}

/// POST /api/orders/:id/check-in - 司机签到
pub async fn check_in(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CheckInRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.check_in(&id, &payload).await?;
    Ok(ok_with_message(order, "Order picked up"))
}

/// POST /api/orders/:id/deliver - 确认送达
pub async fn deliver(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.deliver(&id).await?;
    Ok(ok_with_message(order, "Order delivered"))
}
