//! Product categories within a warehouse

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Category record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub warehouse_id: Uuid,
}

/// Input for creating or renaming a category
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(custom = "shared::validate_name_field")]
    pub name: String,
}

/// Response after renaming a category
#[derive(Debug, Serialize)]
pub struct CategoryUpdated {
    pub detail: String,
    pub data: Category,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, warehouse_id: Uuid, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, warehouse_id)
            VALUES ($1, $2)
            RETURNING id, name, warehouse_id
            "#,
        )
        .bind(input.name.trim())
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    pub async fn list(&self, warehouse_id: Uuid) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, warehouse_id FROM categories WHERE warehouse_id = $1 ORDER BY name",
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn update(
        &self,
        warehouse_id: Uuid,
        category_id: Uuid,
        input: CategoryInput,
    ) -> AppResult<CategoryUpdated> {
        input.validate()?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3
            WHERE id = $1 AND warehouse_id = $2
            RETURNING id, name, warehouse_id
            "#,
        )
        .bind(category_id)
        .bind(warehouse_id)
        .bind(input.name.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(CategoryUpdated {
            detail: "Category updated".to_string(),
            data: category,
        })
    }

    /// Delete a category; its products stay with no category
    pub async fn delete(&self, warehouse_id: Uuid, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND warehouse_id = $2")
            .bind(category_id)
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
