//! Current warehouse extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::AppState;

/// Warehouse the authenticated user has selected.
///
/// Rejects with `NoWarehouseSelected` when the user has none, so it must run
/// behind [`auth_middleware`](crate::middleware::auth_middleware).
#[derive(Clone, Copy, Debug)]
pub struct CurrentWarehouse(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentWarehouse {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .extensions
            .get::<AuthUser>()
            .map(|user| user.user_id)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let warehouse_id = state.selection.require(&state.db, user_id).await?;
        Ok(CurrentWarehouse(warehouse_id))
    }
}
