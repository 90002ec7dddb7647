//! Authentication service for company registration, login, and token management

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{Subscription, UserRole};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    subscription_days: i64,
}

/// Input for registering a company account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, FromRow)]
struct LoginRow {
    id: Uuid,
    password_hash: String,
    #[sqlx(try_from = "String")]
    role: UserRole,
    is_active: bool,
}

/// Decode and verify an access token signed with `secret`
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        AppError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Hash a refresh token for storage
fn hash_token(token: &str) -> String {
    STANDARD.encode(Sha256::digest(token.as_bytes()))
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
            subscription_days: config.company.subscription_days,
        }
    }

    /// Register a company (superuser) account with a fresh subscription window
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        shared::validate_username(&input.username)
            .map_err(|msg| AppError::validation("username", msg))?;
        shared::validate_email(&input.email).map_err(|msg| AppError::validation("email", msg))?;
        shared::validate_password(&input.password)
            .map_err(|msg| AppError::validation("password", msg))?;

        let password_hash = hash_password(&input.password)?;
        let subscription = Subscription::starting(Utc::now().date_naive(), self.subscription_days);

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (username, email, password_hash, role, superuser_start_date, superuser_end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.username.trim())
        .bind(input.email.trim())
        .bind(&password_hash)
        .bind(UserRole::Superuser.as_str())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEntry("username or email".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        tracing::info!(%user_id, end_date = %subscription.end_date, "Company account registered");

        let tokens = self.generate_tokens(user_id, UserRole::Superuser)?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;

        Ok(RegisterResponse {
            user_id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        })
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, LoginRow>(
            "SELECT id, password_hash, role, is_active FROM users WHERE username = $1",
        )
        .bind(username.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let tokens = self.generate_tokens(user.id, user.role)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new token pair, revoking the old one
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        let (user_id, role) = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            RETURNING rt.user_id, u.role
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let role = UserRole::try_from(role).map_err(AppError::Internal)?;
        let tokens = self.generate_tokens(user_id, role)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(hash_token(&tokens.refresh_token))
        .bind(Utc::now() + Duration::seconds(self.refresh_token_expiry))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(tokens)
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(refresh_token))
        .execute(&self.db)
        .await?;

        tracing::debug!(revoked = result.rows_affected(), "Refresh token revoked");
        Ok(())
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, role: UserRole) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let token_hash = hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// Sign an access token for tests that exercise the middleware
#[cfg(test)]
pub fn issue_test_token(user_id: Uuid, role: UserRole, secret: &str, ttl_seconds: i64) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_and_fits_column() {
        let token = Uuid::new_v4().to_string();
        let hashed = hash_token(&token);
        assert_eq!(hashed, hash_token(&token));
        assert_ne!(hashed, hash_token("other"));
        assert!(hashed.len() <= 64);
    }

    #[test]
    fn test_decode_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_test_token(user_id, UserRole::Superuser, "secret", 60);

        let claims = decode_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "superuser");
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = issue_test_token(Uuid::new_v4(), UserRole::User, "secret", 60);
        assert!(matches!(
            decode_access_token(&token, "another-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        // Default validation allows 60s of leeway
        let token = issue_test_token(Uuid::new_v4(), UserRole::User, "secret", -3600);
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[test]
    fn test_password_hash_verifies() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify("correct horse", &hashed).unwrap());
        assert!(!verify("wrong horse", &hashed).unwrap());
    }
}
