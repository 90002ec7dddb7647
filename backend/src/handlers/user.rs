//! User account handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{ChangePasswordInput, CreateUserInput, UserProfile};
use crate::services::UserService;
use crate::AppState;

#[derive(Serialize)]
pub struct PasswordChanged {
    pub detail: String,
}

/// Profile of the authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    let profile = service.get_profile(current_user.0.user_id).await?;
    Ok(Json(profile))
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<PasswordChanged>> {
    let service = UserService::new(state.db);
    service
        .change_password(current_user.0.user_id, input)
        .await?;
    Ok(Json(PasswordChanged {
        detail: "Password updated".to_string(),
    }))
}

/// Create a staff account (company accounts only)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    current_user.0.require_superuser()?;

    let service = UserService::new(state.db);
    let profile = service.create_user(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
