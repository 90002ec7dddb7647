//! Error handling for the warehouse management backend
//!
//! Every failure leaves a handler as a JSON body of the form
//! `{"error": {"code": "...", "message": "...", "field": "..."}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use shared::StockError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("No warehouse selected")]
    NoWarehouseSelected,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock for {product}")]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Map a ledger failure for the named product
    pub fn from_stock(product: &str, err: StockError) -> Self {
        match err {
            StockError::NonPositiveQuantity => AppError::validation("quantity", err.to_string()),
            StockError::Insufficient {
                available,
                requested,
            } => AppError::InsufficientStock {
                product: product.to_string(),
                available,
                requested,
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("body".to_string(), "Invalid request".to_string()));

        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid username or password"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token"),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("ACCOUNT_DISABLED", "This account has been disabled"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                ),
            ),
            AppError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("FORBIDDEN", message.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field),
            ),
            AppError::NoWarehouseSelected => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "NO_WAREHOUSE_SELECTED",
                    "Select a warehouse before using this endpoint",
                )
                .with_field("warehouse"),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
                .with_field(field),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                product,
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    format!(
                        "Not enough {} in stock: {} available, {} requested",
                        product, available, requested
                    ),
                )
                .with_field("quantity"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!(code = %error_detail.code, "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// True when a database error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("Product".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NoWarehouseSelected.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateEntry("sku".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InsufficientPermissions.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_stock_error_mapping() {
        let err = AppError::from_stock(
            "Flour",
            StockError::Insufficient {
                available: Decimal::from(1),
                requested: Decimal::from(2),
            },
        );
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from_stock("Flour", StockError::NonPositiveQuantity);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
