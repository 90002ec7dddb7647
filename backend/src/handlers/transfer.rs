//! HTTP handlers for inter-warehouse transfers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::{CurrentUser, CurrentWarehouse};
use crate::services::transfer::{ProductTransfer, TransferInput, TransferResult};
use crate::services::TransferService;
use crate::AppState;

/// Transfer products out of the current warehouse
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Json(input): Json<TransferInput>,
) -> AppResult<(StatusCode, Json<TransferResult>)> {
    current_user.0.require_superuser()?;
    let service = TransferService::new(state.db);
    let result = service
        .create(current_user.0.user_id, warehouse_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Transfers touching the current warehouse
pub async fn list_transfers(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<ProductTransfer>>> {
    let service = TransferService::new(state.db);
    let transfers = service.list(warehouse_id).await?;
    Ok(Json(transfers))
}
