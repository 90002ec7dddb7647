//! Cash transactions (money in and out) of a warehouse

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::TransactionStatus;

/// Cash transaction service
#[derive(Clone)]
pub struct TransactionService {
    db: PgPool,
}

/// Cash transaction record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CashTransaction {
    pub id: Uuid,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: String,
    pub price: Decimal,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub warehouse_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for recording or updating a cash transaction
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionInput {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl TransactionInput {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        shared::validate_amount(self.price).map_err(|msg| AppError::validation("price", msg))
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, name, category, description, price, status, warehouse_id, created_at";

impl TransactionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        warehouse_id: Uuid,
        input: TransactionInput,
    ) -> AppResult<CashTransaction> {
        input.check()?;

        let transaction = sqlx::query_as::<_, CashTransaction>(&format!(
            r#"
            INSERT INTO transactions (name, category, description, price, status, warehouse_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.status.as_str())
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            %warehouse_id,
            transaction_id = %transaction.id,
            status = transaction.status.as_str(),
            price = %transaction.price,
            "Cash transaction recorded"
        );
        Ok(transaction)
    }

    /// Transactions of the warehouse, newest first
    pub async fn list(&self, warehouse_id: Uuid) -> AppResult<Vec<CashTransaction>> {
        let transactions = sqlx::query_as::<_, CashTransaction>(&format!(
            "SELECT {} FROM transactions WHERE warehouse_id = $1 ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }

    pub async fn get(&self, warehouse_id: Uuid, transaction_id: Uuid) -> AppResult<CashTransaction> {
        sqlx::query_as::<_, CashTransaction>(&format!(
            "SELECT {} FROM transactions WHERE id = $1 AND warehouse_id = $2",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    pub async fn update(
        &self,
        warehouse_id: Uuid,
        transaction_id: Uuid,
        input: TransactionInput,
    ) -> AppResult<CashTransaction> {
        input.check()?;

        sqlx::query_as::<_, CashTransaction>(&format!(
            r#"
            UPDATE transactions
            SET name = $3, category = $4, description = $5, price = $6, status = $7
            WHERE id = $1 AND warehouse_id = $2
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .bind(warehouse_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.status.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    pub async fn delete(&self, warehouse_id: Uuid, transaction_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND warehouse_id = $2")
            .bind(transaction_id)
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(description: &str, price: i64) -> TransactionInput {
        TransactionInput {
            name: None,
            category: None,
            description: description.to_string(),
            price: Decimal::from(price),
            status: TransactionStatus::Exit,
        }
    }

    #[test]
    fn test_input_requires_positive_price() {
        assert!(input("Rent", 100).check().is_ok());
        assert!(matches!(
            input("Rent", 0).check(),
            Err(AppError::Validation { ref field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_input_requires_description() {
        assert!(matches!(
            input("", 10).check(),
            Err(AppError::Validation { ref field, .. }) if field == "description"
        ));
    }
}
