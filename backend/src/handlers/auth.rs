//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::auth::{AuthTokens, RegisterInput, RegisterResponse};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub detail: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(&body.username, &body.password).await?;
    Ok(Json(tokens))
}

/// Register company endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Logout endpoint handler; revokes the given refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.logout(&body.refresh_token).await?;
    Ok(Json(LogoutResponse {
        detail: "Logged out".to_string(),
    }))
}
