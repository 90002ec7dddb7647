//! HTTP handlers for warehouses and the current-warehouse selection

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::warehouse::{AddMemberInput, SelectedWarehouse, Warehouse, WarehouseInput};
use crate::services::WarehouseService;
use crate::AppState;

fn service(state: AppState) -> WarehouseService {
    WarehouseService::new(state.db, state.selection)
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    current_user.0.require_superuser()?;
    let warehouse = service(state)
        .create(current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// List the caller's warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let warehouses = service(state).list(current_user.0.user_id).await?;
    Ok(Json(warehouses))
}

/// Get a warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = service(state)
        .get(current_user.0.user_id, warehouse_id)
        .await?;
    Ok(Json(warehouse))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<WarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    current_user.0.require_superuser()?;
    let warehouse = service(state)
        .update(current_user.0.user_id, warehouse_id, input)
        .await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_superuser()?;
    service(state)
        .delete(current_user.0.user_id, warehouse_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to a warehouse
pub async fn add_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<AddMemberInput>,
) -> AppResult<StatusCode> {
    current_user.0.require_superuser()?;
    service(state)
        .add_member(current_user.0.user_id, warehouse_id, input)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from a warehouse
pub async fn remove_member(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((warehouse_id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    current_user.0.require_superuser()?;
    service(state)
        .remove_member(current_user.0.user_id, warehouse_id, member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's current warehouse
pub async fn get_current_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Warehouse>> {
    let warehouse = service(state).current(current_user.0.user_id).await?;
    Ok(Json(warehouse))
}

/// Select the caller's current warehouse
pub async fn select_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<SelectedWarehouse>> {
    let selected = service(state)
        .select(current_user.0.user_id, warehouse_id)
        .await?;
    Ok(Json(selected))
}
