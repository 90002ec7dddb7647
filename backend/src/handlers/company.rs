//! Company subscription handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::CompanyService;
use crate::AppState;

/// Subscription status of the calling company account.
///
/// Regular users have no company status and get `204 No Content`.
pub async fn get_company_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Response> {
    if !current_user.0.is_superuser() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let service = CompanyService::new(state.db);
    let status = service.status(current_user.0.user_id).await?;
    Ok(Json(status).into_response())
}
