//! HTTP handlers for categories of the current warehouse

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{CurrentUser, CurrentWarehouse};
use crate::services::category::{Category, CategoryInput, CategoryUpdated};
use crate::services::CategoryService;
use crate::AppState;

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    current_user.0.require_superuser()?;
    let service = CategoryService::new(state.db);
    let category = service.create(warehouse_id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list(warehouse_id).await?;
    Ok(Json(categories))
}

/// Rename a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<CategoryUpdated>> {
    current_user.0.require_superuser()?;
    let service = CategoryService::new(state.db);
    let updated = service.update(warehouse_id, category_id, input).await?;
    Ok(Json(updated))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_superuser()?;
    let service = CategoryService::new(state.db);
    service.delete(warehouse_id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
