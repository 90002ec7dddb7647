//! Warehouse management, membership, and the per-user current warehouse

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::cache::WarehouseSelection;
use crate::error::{AppError, AppResult};

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
    selection: WarehouseSelection,
}

/// Warehouse record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub created_at: NaiveDate,
}

/// Input for creating or updating a warehouse
#[derive(Debug, Deserialize, Validate)]
pub struct WarehouseInput {
    #[validate(custom = "shared::validate_name_field")]
    pub name: String,
    #[validate(custom = "shared::validate_name_field")]
    pub location: String,
}

/// Input for adding a member
#[derive(Debug, Deserialize)]
pub struct AddMemberInput {
    pub user_id: Uuid,
}

/// Result of selecting a warehouse
#[derive(Debug, Serialize)]
pub struct SelectedWarehouse {
    pub detail: String,
    pub warehouse: Warehouse,
}

impl WarehouseService {
    pub fn new(db: PgPool, selection: WarehouseSelection) -> Self {
        Self { db, selection }
    }

    /// Create a warehouse; the creator becomes its first member
    pub async fn create(&self, owner_id: Uuid, input: WarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, location)
            VALUES ($1, $2)
            RETURNING id, name, location, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.location.trim())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO warehouse_users (warehouse_id, user_id) VALUES ($1, $2)")
            .bind(warehouse.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(warehouse_id = %warehouse.id, %owner_id, "Warehouse created");
        Ok(warehouse)
    }

    /// Warehouses the user belongs to, oldest first
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT w.id, w.name, w.location, w.created_at
            FROM warehouses w
            JOIN warehouse_users wu ON wu.warehouse_id = w.id
            WHERE wu.user_id = $1
            ORDER BY w.created_ts ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(warehouses)
    }

    /// Warehouse detail, visible to members only
    pub async fn get(&self, user_id: Uuid, warehouse_id: Uuid) -> AppResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT w.id, w.name, w.location, w.created_at
            FROM warehouses w
            JOIN warehouse_users wu ON wu.warehouse_id = w.id
            WHERE w.id = $1 AND wu.user_id = $2
            "#,
        )
        .bind(warehouse_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        warehouse_id: Uuid,
        input: WarehouseInput,
    ) -> AppResult<Warehouse> {
        input.validate()?;
        self.get(user_id, warehouse_id).await?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $2, location = $3
            WHERE id = $1
            RETURNING id, name, location, created_at
            "#,
        )
        .bind(warehouse_id)
        .bind(input.name.trim())
        .bind(input.location.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(warehouse)
    }

    /// Delete a warehouse with everything scoped to it
    pub async fn delete(&self, user_id: Uuid, warehouse_id: Uuid) -> AppResult<()> {
        self.get(user_id, warehouse_id).await?;

        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        self.selection.forget_warehouse(warehouse_id);
        tracing::info!(%warehouse_id, %user_id, "Warehouse deleted");
        Ok(())
    }

    pub async fn add_member(
        &self,
        user_id: Uuid,
        warehouse_id: Uuid,
        input: AddMemberInput,
    ) -> AppResult<()> {
        self.get(user_id, warehouse_id).await?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(input.user_id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(AppError::NotFound("User".to_string()));
        }

        sqlx::query(
            "INSERT INTO warehouse_users (warehouse_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(warehouse_id)
        .bind(input.user_id)
        .execute(&self.db)
        .await?;

        tracing::info!(%warehouse_id, member_id = %input.user_id, "Member added");
        Ok(())
    }

    /// Remove a member and clear their selection if it pointed here
    pub async fn remove_member(
        &self,
        user_id: Uuid,
        warehouse_id: Uuid,
        member_id: Uuid,
    ) -> AppResult<()> {
        self.get(user_id, warehouse_id).await?;

        let mut tx = self.db.begin().await?;

        let result =
            sqlx::query("DELETE FROM warehouse_users WHERE warehouse_id = $1 AND user_id = $2")
                .bind(warehouse_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Member".to_string()));
        }

        sqlx::query(
            "UPDATE users SET current_warehouse_id = NULL WHERE id = $1 AND current_warehouse_id = $2",
        )
        .bind(member_id)
        .bind(warehouse_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.selection.forget_user(member_id, warehouse_id);
        tracing::info!(%warehouse_id, %member_id, "Member removed");
        Ok(())
    }

    /// The user's current warehouse, falling back to their first one
    pub async fn current(&self, user_id: Uuid) -> AppResult<Warehouse> {
        if let Some(warehouse_id) = self.selection.get(&self.db, user_id).await? {
            match self.get(user_id, warehouse_id).await {
                Ok(warehouse) => return Ok(warehouse),
                Err(AppError::NotFound(_)) => self.selection.forget_user(user_id, warehouse_id),
                Err(e) => return Err(e),
            }
        }

        let first = self
            .list(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        self.selection.set(&self.db, user_id, first.id).await?;
        Ok(first)
    }

    /// Make a warehouse the user's current one
    pub async fn select(&self, user_id: Uuid, warehouse_id: Uuid) -> AppResult<SelectedWarehouse> {
        let warehouse = self.get(user_id, warehouse_id).await?;
        self.selection.set(&self.db, user_id, warehouse.id).await?;

        Ok(SelectedWarehouse {
            detail: format!("Warehouse {} selected", warehouse.name),
            warehouse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warehouse_input_validation() {
        let ok = WarehouseInput {
            name: "Main".into(),
            location: "Tashkent".into(),
        };
        assert!(ok.validate().is_ok());

        let empty_name = WarehouseInput {
            name: String::new(),
            location: "Tashkent".into(),
        };
        let err: AppError = empty_name.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));

        let blank_location = WarehouseInput {
            name: "Main".into(),
            location: "   ".into(),
        };
        let err: AppError = blank_location.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "location"));
    }
}
