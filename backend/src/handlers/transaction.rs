//! HTTP handlers for cash transactions of the current warehouse

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentWarehouse;
use crate::services::transaction::{CashTransaction, TransactionInput};
use crate::services::TransactionService;
use crate::AppState;

/// Record a cash transaction
pub async fn create_cash_transaction(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Json(input): Json<TransactionInput>,
) -> AppResult<(StatusCode, Json<CashTransaction>)> {
    let service = TransactionService::new(state.db);
    let transaction = service.create(warehouse_id, input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List cash transactions, newest first
pub async fn list_cash_transactions(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<CashTransaction>>> {
    let service = TransactionService::new(state.db);
    let transactions = service.list(warehouse_id).await?;
    Ok(Json(transactions))
}

/// Get a cash transaction
pub async fn get_cash_transaction(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<CashTransaction>> {
    let service = TransactionService::new(state.db);
    let transaction = service.get(warehouse_id, transaction_id).await?;
    Ok(Json(transaction))
}

/// Update a cash transaction
pub async fn update_cash_transaction(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(transaction_id): Path<Uuid>,
    Json(input): Json<TransactionInput>,
) -> AppResult<Json<CashTransaction>> {
    let service = TransactionService::new(state.db);
    let transaction = service
        .update(warehouse_id, transaction_id, input)
        .await?;
    Ok(Json(transaction))
}

/// Delete a cash transaction
pub async fn delete_cash_transaction(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = TransactionService::new(state.db);
    service.delete(warehouse_id, transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
