//! Product catalog of a warehouse, stock listings, and CSV export

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{cash_value, classify, investment, validate_pricing, validate_quantities};
use crate::models::{ProductStatus, Unit};
use crate::services::analytics::AnalyticsService;

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product with its derived stock figures
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub base_price: Decimal,
    pub discount_price: Decimal,
    pub quantity: Decimal,
    pub min_quantity: Decimal,
    pub unit: Unit,
    pub image_url: Option<String>,
    pub description: String,
    pub warehouse_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ProductStatus,
    pub investment: Decimal,
    pub cash_value: Decimal,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    price: Decimal,
    base_price: Decimal,
    discount_price: Decimal,
    quantity: Decimal,
    min_quantity: Decimal,
    #[sqlx(try_from = "String")]
    unit: Unit,
    image_url: Option<String>,
    description: String,
    warehouse_id: Option<Uuid>,
    category_id: Option<Uuid>,
    category: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            status: classify(row.quantity, row.min_quantity),
            investment: investment(row.quantity, row.base_price),
            cash_value: cash_value(row.quantity, row.price, row.discount_price),
            id: row.id,
            name: row.name,
            sku: row.sku,
            price: row.price,
            base_price: row.base_price,
            discount_price: row.discount_price,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            unit: row.unit,
            image_url: row.image_url,
            description: row.description,
            warehouse_id: row.warehouse_id,
            category_id: row.category_id,
            category: row.category,
            created_at: row.created_at,
        }
    }
}

/// Input for creating or replacing a product.
///
/// `category` is a category name looked up in the current warehouse.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub base_price: Decimal,
    #[serde(default)]
    pub discount_price: Decimal,
    pub quantity: Option<Decimal>,
    pub min_quantity: Option<Decimal>,
    pub unit: Option<Unit>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
}

impl ProductInput {
    fn validate(&self) -> AppResult<()> {
        shared::validate_name(&self.name).map_err(|msg| AppError::validation("name", msg))?;
        shared::validate_sku(&self.sku).map_err(|msg| AppError::validation("sku", msg))?;
        validate_pricing(self.price, self.base_price, self.discount_price)
            .map_err(|msg| AppError::validation("price", msg))?;
        validate_quantities(
            self.quantity.unwrap_or(Decimal::ZERO),
            self.min_quantity.unwrap_or(Decimal::ZERO),
        )
        .map_err(|msg| AppError::validation("quantity", msg))?;
        Ok(())
    }
}

/// Which slice of the catalog to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockFilter {
    /// Products with stock left
    Available,
    /// Products that ran out
    Finished,
    /// Products with stock below their minimum
    Low,
}

impl StockFilter {
    fn condition(&self) -> &'static str {
        match self {
            StockFilter::Available => "p.quantity > 0",
            StockFilter::Finished => "p.quantity = 0",
            StockFilter::Low => "p.quantity > 0 AND p.quantity < p.min_quantity",
        }
    }
}

/// One row of the stock export
#[derive(Debug, Serialize)]
pub struct ProductExportRow {
    pub name: String,
    pub price: Decimal,
    pub discount_price: Decimal,
    pub base_price: Decimal,
    pub quantity: Decimal,
    pub min_quantity: Decimal,
    pub investment: Decimal,
    pub cash_value: Decimal,
    pub status: ProductStatus,
}

impl From<&Product> for ProductExportRow {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            discount_price: product.discount_price,
            base_price: product.base_price,
            quantity: product.quantity,
            min_quantity: product.min_quantity,
            investment: product.investment,
            cash_value: product.cash_value,
            status: product.status,
        }
    }
}

/// Order export rows good, then low, then finished; stable within a group
pub fn export_rows(products: &[Product]) -> Vec<ProductExportRow> {
    let mut rows: Vec<ProductExportRow> = products.iter().map(ProductExportRow::from).collect();
    rows.sort_by_key(|row| row.status.rank());
    rows
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.sku, p.price, p.base_price, p.discount_price,
           p.quantity, p.min_quantity, p.unit, p.image_url, p.description,
           p.warehouse_id, p.category_id, c.name AS category, p.created_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, warehouse_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        self.ensure_sku_free(warehouse_id, &input.sku, None).await?;
        let category_id = self
            .resolve_category(warehouse_id, input.category.as_deref())
            .await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (
                name, sku, price, base_price, discount_price, quantity, min_quantity,
                unit, image_url, description, warehouse_id, category_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.sku.trim())
        .bind(input.price)
        .bind(input.base_price)
        .bind(input.discount_price)
        .bind(input.quantity.unwrap_or(Decimal::ZERO))
        .bind(input.min_quantity.unwrap_or(Decimal::ZERO))
        .bind(input.unit.unwrap_or_default().as_str())
        .bind(&input.image_url)
        .bind(&input.description)
        .bind(warehouse_id)
        .bind(category_id)
        .fetch_one(&self.db)
        .await
        .map_err(map_sku_conflict)?;

        tracing::info!(%warehouse_id, %product_id, sku = %input.sku, "Product created");
        self.get(warehouse_id, product_id).await
    }

    pub async fn update(
        &self,
        warehouse_id: Uuid,
        product_id: Uuid,
        input: ProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        self.ensure_sku_free(warehouse_id, &input.sku, Some(product_id))
            .await?;
        let category_id = self
            .resolve_category(warehouse_id, input.category.as_deref())
            .await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, sku = $4, price = $5, base_price = $6, discount_price = $7,
                quantity = COALESCE($8, quantity), min_quantity = COALESCE($9, min_quantity),
                unit = $10, image_url = $11, description = $12, category_id = $13
            WHERE id = $1 AND warehouse_id = $2
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(input.name.trim())
        .bind(input.sku.trim())
        .bind(input.price)
        .bind(input.base_price)
        .bind(input.discount_price)
        .bind(input.quantity)
        .bind(input.min_quantity)
        .bind(input.unit.unwrap_or_default().as_str())
        .bind(&input.image_url)
        .bind(&input.description)
        .bind(category_id)
        .execute(&self.db)
        .await
        .map_err(map_sku_conflict)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.get(warehouse_id, product_id).await
    }

    pub async fn delete(&self, warehouse_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND warehouse_id = $2")
            .bind(product_id)
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(%warehouse_id, %product_id, "Product deleted");
        Ok(())
    }

    pub async fn get(&self, warehouse_id: Uuid, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.id = $1 AND p.warehouse_id = $2",
            PRODUCT_SELECT
        ))
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List products matching a stock filter, newest first
    pub async fn list(&self, warehouse_id: Uuid, filter: StockFilter) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.warehouse_id = $1 AND {} ORDER BY p.created_at DESC",
            PRODUCT_SELECT,
            filter.condition()
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Whole catalog as CSV, grouped by stock status
    pub async fn export_csv(&self, warehouse_id: Uuid) -> AppResult<String> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.warehouse_id = $1 ORDER BY p.created_at DESC",
            PRODUCT_SELECT
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        let products: Vec<Product> = rows.into_iter().map(Product::from).collect();
        AnalyticsService::export_to_csv(&export_rows(&products))
    }

    async fn ensure_sku_free(
        &self,
        warehouse_id: Uuid,
        sku: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM products
                WHERE warehouse_id = $1 AND sku = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(warehouse_id)
        .bind(sku.trim())
        .bind(exclude)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }
        Ok(())
    }

    async fn resolve_category(
        &self,
        warehouse_id: Uuid,
        name: Option<&str>,
    ) -> AppResult<Option<Uuid>> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM categories WHERE warehouse_id = $1 AND name = $2 LIMIT 1",
        )
        .bind(warehouse_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(Some(id))
    }
}

fn map_sku_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::DuplicateEntry("sku".to_string())
    } else {
        AppError::DatabaseError(e)
    }
}
