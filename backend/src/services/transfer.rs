//! Moving stock between warehouses

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::stock;
use crate::services::order::set_quantity;

/// Transfer service
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

/// Recorded movement of one product between two warehouses
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductTransfer {
    pub id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub product_id: Uuid,
    pub to_product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub transferred_at: DateTime<Utc>,
}

/// Input for transferring products out of the current warehouse
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub to_warehouse: Uuid,
    pub items: Vec<TransferItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

/// Response after a transfer
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub message: String,
    pub transfers: Vec<ProductTransfer>,
}

#[derive(Debug, FromRow)]
struct SourceProduct {
    id: Uuid,
    name: String,
    sku: String,
    price: Decimal,
    base_price: Decimal,
    discount_price: Decimal,
    min_quantity: Decimal,
    unit: String,
    image_url: Option<String>,
    description: String,
    category: Option<String>,
}

impl TransferService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Move whole quantities of products from `from_warehouse` to another warehouse
    /// the user belongs to. Products missing at the destination are created from the
    /// source product with an empty stock.
    pub async fn create(
        &self,
        user_id: Uuid,
        from_warehouse: Uuid,
        input: TransferInput,
    ) -> AppResult<TransferResult> {
        let quantities: Vec<Decimal> = input.items.iter().map(|item| item.quantity).collect();
        shared::validate_transfer_quantities(&quantities)
            .map_err(|msg| AppError::validation("items", msg))?;

        let to_warehouse = input.to_warehouse;
        if to_warehouse == from_warehouse {
            return Err(AppError::validation(
                "to_warehouse",
                "Destination must differ from the current warehouse",
            ));
        }

        let is_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouse_users WHERE warehouse_id = $1 AND user_id = $2)",
        )
        .bind(to_warehouse)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        if !is_member {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let source_ids: Vec<Uuid> = input.items.iter().map(|item| item.product_id).collect();
        let sources = load_sources(&mut tx, from_warehouse, &source_ids).await?;
        let destinations = resolve_destinations(&mut tx, to_warehouse, &sources).await?;

        // Both sides are locked in one pass, in id order, before any stock moves
        let touched = lock_order(sources.keys().chain(destinations.values()).copied());
        let mut levels = lock_products(&mut tx, &touched).await?;

        let mut transfers = Vec::with_capacity(input.items.len());

        for item in &input.items {
            let source = sources
                .get(&item.product_id)
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
            let destination_id = *destinations.get(&source.sku).ok_or_else(|| {
                AppError::Internal("Destination product missing after insert".to_string())
            })?;

            let available = stock_level(&levels, source.id)?;
            let held = stock_level(&levels, destination_id)?;

            let (remaining, received) = stock::transfer(available, held, item.quantity)
                .map_err(|e| AppError::from_stock(&source.name, e))?;

            set_quantity(&mut tx, source.id, remaining).await?;
            set_quantity(&mut tx, destination_id, received).await?;
            levels.insert(source.id, remaining);
            levels.insert(destination_id, received);

            let (id, transferred_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
                r#"
                INSERT INTO product_transfers
                    (from_warehouse_id, to_warehouse_id, product_id, to_product_id, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, transferred_at
                "#,
            )
            .bind(from_warehouse)
            .bind(to_warehouse)
            .bind(source.id)
            .bind(destination_id)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;

            tracing::info!(
                %from_warehouse,
                %to_warehouse,
                product_id = %source.id,
                to_product_id = %destination_id,
                quantity = %item.quantity,
                "Stock transferred"
            );

            transfers.push(ProductTransfer {
                id,
                from_warehouse_id: from_warehouse,
                to_warehouse_id: to_warehouse,
                product_id: source.id,
                to_product_id: destination_id,
                product_name: source.name.clone(),
                quantity: item.quantity,
                transferred_at,
            });
        }

        tx.commit().await?;

        Ok(TransferResult {
            message: format!("{} product(s) transferred", transfers.len()),
            transfers,
        })
    }

    /// Transfers into or out of the warehouse, newest first
    pub async fn list(&self, warehouse_id: Uuid) -> AppResult<Vec<ProductTransfer>> {
        let transfers = sqlx::query_as::<_, ProductTransfer>(
            r#"
            SELECT t.id, t.from_warehouse_id, t.to_warehouse_id, t.product_id, t.to_product_id,
                   p.name AS product_name, t.quantity, t.transferred_at
            FROM product_transfers t
            JOIN products p ON p.id = t.product_id
            WHERE t.from_warehouse_id = $1 OR t.to_warehouse_id = $1
            ORDER BY t.transferred_at DESC
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transfers)
    }
}

/// Source products of a transfer, keyed by id; every requested id must exist
async fn load_sources(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, SourceProduct>> {
    let sources: HashMap<Uuid, SourceProduct> = sqlx::query_as::<_, SourceProduct>(
        r#"
        SELECT p.id, p.name, p.sku, p.price, p.base_price, p.discount_price,
               p.min_quantity, p.unit, p.image_url, p.description, c.name AS category
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.id = ANY($1) AND p.warehouse_id = $2
        "#,
    )
    .bind(product_ids)
    .bind(warehouse_id)
    .fetch_all(&mut **tx)
    .await?
    .into_iter()
    .map(|source| (source.id, source))
    .collect();

    if product_ids.iter().any(|id| !sources.contains_key(id)) {
        return Err(AppError::NotFound("Product".to_string()));
    }

    Ok(sources)
}

async fn find_by_sku(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
    skus: &[String],
) -> AppResult<HashMap<String, Uuid>> {
    let rows = sqlx::query_as::<_, (String, Uuid)>(
        "SELECT sku, id FROM products WHERE warehouse_id = $1 AND sku = ANY($2)",
    )
    .bind(warehouse_id)
    .bind(skus)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Destination product id per source sku, creating empty copies for missing skus
async fn resolve_destinations(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
    sources: &HashMap<Uuid, SourceProduct>,
) -> AppResult<HashMap<String, Uuid>> {
    let mut skus: Vec<String> = sources.values().map(|source| source.sku.clone()).collect();
    skus.sort();
    skus.dedup();

    let found = find_by_sku(tx, warehouse_id, &skus).await?;

    let mut missing: Vec<&SourceProduct> = sources
        .values()
        .filter(|source| !found.contains_key(&source.sku))
        .collect();
    if missing.is_empty() {
        return Ok(found);
    }

    // Inserts hold the unique index entry, so they follow sku order too
    missing.sort_by(|a, b| a.sku.cmp(&b.sku));
    for source in missing {
        create_empty_copy(tx, warehouse_id, source).await?;
    }

    find_by_sku(tx, warehouse_id, &skus).await
}

async fn create_empty_copy(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
    source: &SourceProduct,
) -> AppResult<()> {
    let category_id = match source.category.as_deref() {
        Some(name) => {
            sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM categories WHERE warehouse_id = $1 AND name = $2 LIMIT 1",
            )
            .bind(warehouse_id)
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?
        }
        None => None,
    };

    sqlx::query(
        r#"
        INSERT INTO products (
            name, sku, price, base_price, discount_price, quantity, min_quantity,
            unit, image_url, description, warehouse_id, category_id
        )
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (sku, warehouse_id) DO NOTHING
        "#,
    )
    .bind(&source.name)
    .bind(&source.sku)
    .bind(source.price)
    .bind(source.base_price)
    .bind(source.discount_price)
    .bind(source.min_quantity)
    .bind(&source.unit)
    .bind(&source.image_url)
    .bind(&source.description)
    .bind(warehouse_id)
    .bind(category_id)
    .execute(&mut **tx)
    .await?;

    tracing::debug!(%warehouse_id, sku = %source.sku, "Created destination product for transfer");
    Ok(())
}

/// Row lock order shared by every stock movement: ascending id, each row once
fn lock_order(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Lock the given products and return their quantities
async fn lock_products(
    tx: &mut Transaction<'_, Postgres>,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Decimal>> {
    let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
        "SELECT id, quantity FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(product_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().collect())
}

fn stock_level(levels: &HashMap<Uuid, Decimal>, product_id: Uuid) -> AppResult<Decimal> {
    levels
        .get(&product_id)
        .copied()
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}
