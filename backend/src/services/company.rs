//! Company subscription status

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Subscription;

/// Company service
#[derive(Clone)]
pub struct CompanyService {
    db: PgPool,
}

/// Subscription status of the calling company account
#[derive(Debug, Clone, Serialize)]
pub struct CompanyStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub company: String,
    pub end_date: NaiveDate,
}

impl CompanyStatus {
    fn evaluate(company: String, subscription: Subscription, today: NaiveDate) -> Self {
        if subscription.is_expired(today) {
            Self {
                message: None,
                warning: Some("Company subscription has expired".to_string()),
                company,
                end_date: subscription.end_date,
            }
        } else {
            Self {
                message: Some("Company is active".to_string()),
                warning: None,
                company,
                end_date: subscription.end_date,
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        self.warning.is_some()
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    username: String,
    superuser_start_date: Option<NaiveDate>,
    superuser_end_date: Option<NaiveDate>,
}

impl CompanyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Check the caller's subscription, deactivating the account once it has lapsed
    pub async fn status(&self, user_id: Uuid) -> AppResult<CompanyStatus> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT username, superuser_start_date, superuser_end_date
            FROM users
            WHERE id = $1 AND role = 'superuser'
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))?;

        let (Some(start_date), Some(end_date)) = (row.superuser_start_date, row.superuser_end_date)
        else {
            return Err(AppError::Internal(
                "Company account has no subscription window".to_string(),
            ));
        };

        let subscription = Subscription {
            start_date,
            end_date,
        };
        let status = CompanyStatus::evaluate(row.username, subscription, Utc::now().date_naive());

        if status.is_expired() {
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active")
                .bind(user_id)
                .execute(&self.db)
                .await?;
            tracing::warn!(%user_id, %end_date, "Company subscription expired, account deactivated");
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_active_through_end_date() {
        let subscription = Subscription::starting(date(2025, 3, 1), 30);
        let status = CompanyStatus::evaluate("acme".into(), subscription, date(2025, 3, 31));
        assert!(!status.is_expired());
        assert_eq!(status.message.as_deref(), Some("Company is active"));
    }

    #[test]
    fn test_status_expired_day_after_end() {
        let subscription = Subscription::starting(date(2025, 3, 1), 30);
        let status = CompanyStatus::evaluate("acme".into(), subscription, date(2025, 4, 1));
        assert!(status.is_expired());
        assert_eq!(status.end_date, date(2025, 3, 31));
        assert!(status.message.is_none());
    }
}
