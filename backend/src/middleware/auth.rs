//! Authentication middleware
//!
//! JWT authentication and role checks

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorDetail, ErrorResponse};
use crate::models::UserRole;
use crate::services::auth::decode_access_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_superuser(&self) -> bool {
        self.role.is_superuser()
    }

    /// Fail with `InsufficientPermissions` unless the user is a company account
    pub fn require_superuser(&self) -> AppResult<()> {
        if self.is_superuser() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Authentication middleware that validates the bearer token against the
/// configured secret and stores an [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let claims = match decode_access_token(bearer.token(), &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(_) => return unauthorized_response("Invalid or expired token"),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let role = match UserRole::try_from(claims.role) {
        Ok(role) => role,
        Err(_) => return unauthorized_response("Invalid role in token"),
    };

    let is_active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await;

    if let Err(err) = is_active.map_err(AppError::from).and_then(ensure_active) {
        return err.into_response();
    }

    request.extensions_mut().insert(AuthUser { user_id, role });

    next.run(request).await
}

/// Tokens outlive accounts: reject deleted or deactivated users
fn ensure_active(is_active: Option<bool>) -> AppResult<()> {
    match is_active {
        Some(true) => Ok(()),
        Some(false) => Err(AppError::AccountDisabled),
        None => Err(AppError::Unauthorized("Account no longer exists".to_string())),
    }
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail::new("UNAUTHORIZED", "Authentication required"),
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_superuser() {
        let owner = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Superuser,
        };
        let clerk = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        };

        assert!(owner.require_superuser().is_ok());
        assert!(matches!(
            clerk.require_superuser(),
            Err(AppError::InsufficientPermissions)
        ));
    }

    #[test]
    fn test_inactive_accounts_are_rejected() {
        assert!(ensure_active(Some(true)).is_ok());

        let disabled = ensure_active(Some(false)).unwrap_err();
        assert!(matches!(disabled, AppError::AccountDisabled));
        assert_eq!(disabled.into_response().status(), StatusCode::FORBIDDEN);

        let missing = ensure_active(None).unwrap_err();
        assert_eq!(missing.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
