//! User accounts: profile, password changes, and staff accounts created by a company

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{subscription_dates, UserRole};
use crate::services::auth::hash_password;

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// User profile as returned to clients
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: NaiveDate,
    pub superuser_start_date: Option<NaiveDate>,
    pub superuser_end_date: Option<NaiveDate>,
    pub current_warehouse_id: Option<Uuid>,
}

/// Input for changing the caller's password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub password: String,
}

/// Input for creating a staff account
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub warehouse_ids: Vec<Uuid>,
}

const PROFILE_COLUMNS: &str = "id, username, email, role, is_active, created_at, \
     superuser_start_date, superuser_end_date, current_warehouse_id";

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Load a user profile
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Replace the user's password
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> AppResult<()> {
        shared::validate_password(&input.password)
            .map_err(|msg| AppError::validation("password", msg))?;

        let password_hash = hash_password(&input.password)?;

        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        // Outstanding refresh tokens stop working with the old password
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        tracing::info!(%user_id, "Password changed");
        Ok(())
    }

    /// Create a regular user and add them to warehouses the company account belongs to
    pub async fn create_user(&self, owner_id: Uuid, input: CreateUserInput) -> AppResult<UserProfile> {
        shared::validate_username(&input.username)
            .map_err(|msg| AppError::validation("username", msg))?;
        shared::validate_email(&input.email).map_err(|msg| AppError::validation("email", msg))?;
        shared::validate_password(&input.password)
            .map_err(|msg| AppError::validation("password", msg))?;

        let password_hash = hash_password(&input.password)?;
        let (start, end) = subscription_dates(UserRole::User, None, None, Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        for warehouse_id in &input.warehouse_ids {
            let is_member = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouse_users WHERE warehouse_id = $1 AND user_id = $2)",
            )
            .bind(warehouse_id)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

            if !is_member {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, superuser_start_date, superuser_end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(input.username.trim())
        .bind(input.email.trim())
        .bind(&password_hash)
        .bind(UserRole::User.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEntry("username or email".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        for warehouse_id in &input.warehouse_ids {
            sqlx::query(
                "INSERT INTO warehouse_users (warehouse_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(warehouse_id)
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            user_id = %profile.id,
            %owner_id,
            warehouses = input.warehouse_ids.len(),
            "User created"
        );
        Ok(profile)
    }
}
