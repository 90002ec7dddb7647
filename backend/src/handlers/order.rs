//! HTTP handlers for orders of the current warehouse

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::analytics::DateRangeQuery;
use crate::middleware::CurrentWarehouse;
use crate::services::order::{CreateOrderInput, Order};
use crate::services::OrderService;
use crate::AppState;

/// Place an order
pub async fn create_order(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.db);
    let order = service.create(warehouse_id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list(warehouse_id).await?;
    Ok(Json(orders))
}

/// Orders placed within a date range
pub async fn list_orders_in_range(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let range = query.into_range()?;
    let service = OrderService::new(state.db);
    let orders = service.list_in_range(warehouse_id, range).await?;
    Ok(Json(orders))
}

/// Get an order
pub async fn get_order(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let service = OrderService::new(state.db);
    let order = service.get(warehouse_id, order_id).await?;
    Ok(Json(order))
}

/// Delete an order and restore its stock
pub async fn delete_order(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(order_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = OrderService::new(state.db);
    service.delete(warehouse_id, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
