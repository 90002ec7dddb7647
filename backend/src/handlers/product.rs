//! HTTP handlers for the product catalog of the current warehouse

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentWarehouse;
use crate::services::product::{Product, ProductInput, StockFilter};
use crate::services::ProductService;
use crate::AppState;

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = ProductService::new(state.db);
    let product = service.create(warehouse_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product
pub async fn update_product(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.update(warehouse_id, product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.delete(warehouse_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get(warehouse_id, product_id).await?;
    Ok(Json(product))
}

/// Products in stock, newest first
pub async fn list_products(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list(warehouse_id, StockFilter::Available).await?;
    Ok(Json(products))
}

/// Products that ran out
pub async fn list_finished_products(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list(warehouse_id, StockFilter::Finished).await?;
    Ok(Json(products))
}

/// Products below their minimum quantity
pub async fn list_low_products(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list(warehouse_id, StockFilter::Low).await?;
    Ok(Json(products))
}

/// Download the catalog as CSV
pub async fn export_products(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<impl IntoResponse> {
    let service = ProductService::new(state.db);
    let csv = service.export_csv(warehouse_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"products_warehouse_{}.csv\"", warehouse_id),
            ),
        ],
        csv,
    ))
}
