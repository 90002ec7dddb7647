//! Orders: stock withdrawals recorded against the current warehouse
//!
//! Creating and deleting an order runs in one transaction with the touched
//! product rows locked, so an order is either fully applied or not at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::stock;
use crate::models::{effective_price, line_total, Unit};
use shared::types::DateRange;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub items: Vec<OrderItem>,
}

/// Order line with the prices captured when it was placed
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    #[sqlx(try_from = "String")]
    pub unit: Unit,
    pub quantity: Decimal,
    pub base_price: Decimal,
    pub price: Decimal,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    warehouse_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LockedProduct {
    id: Uuid,
    name: String,
    quantity: Decimal,
    price: Decimal,
    base_price: Decimal,
    discount_price: Decimal,
}

/// Input for placing an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

const ITEM_SELECT: &str = r#"
    SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, p.unit,
           oi.quantity, oi.base_price, oi.price
    FROM order_items oi
    JOIN products p ON p.id = oi.product_id
"#;

fn order_total(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| line_total(item.quantity, item.price))
        .sum()
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place an order, withdrawing every line from stock
    pub async fn create(&self, warehouse_id: Uuid, input: CreateOrderInput) -> AppResult<Order> {
        let quantities: Vec<Decimal> = input.items.iter().map(|item| item.quantity).collect();
        shared::validate_order_quantities(&quantities)
            .map_err(|msg| AppError::validation("items", msg))?;

        // Ascending product id, the same order transfers lock in
        let mut items = input.items;
        items.sort_by_key(|item| item.product_id);

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (warehouse_id) VALUES ($1) RETURNING id, warehouse_id, created_at",
        )
        .bind(warehouse_id)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            let product = lock_product(&mut tx, warehouse_id, item.product_id).await?;

            let remaining = stock::withdraw(product.quantity, item.quantity)
                .map_err(|e| AppError::from_stock(&product.name, e))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, base_price, price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id)
            .bind(product.id)
            .bind(item.quantity)
            .bind(product.base_price)
            .bind(effective_price(product.price, product.discount_price))
            .execute(&mut *tx)
            .await?;

            set_quantity(&mut tx, product.id, remaining).await?;

            tracing::info!(
                %warehouse_id,
                product_id = %product.id,
                quantity = %item.quantity,
                remaining = %remaining,
                "Stock withdrawn for order"
            );
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, %warehouse_id, lines = items.len(), "Order created");
        self.get(warehouse_id, order.id).await
    }

    /// Orders of the warehouse, newest first
    pub async fn list(&self, warehouse_id: Uuid) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, warehouse_id, created_at
            FROM orders
            WHERE warehouse_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        self.with_items(orders).await
    }

    /// Orders placed on the calendar days of `range`, newest first
    pub async fn list_in_range(&self, warehouse_id: Uuid, range: DateRange) -> AppResult<Vec<Order>> {
        let (from, until) = range.bounds();

        let orders = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, warehouse_id, created_at
            FROM orders
            WHERE warehouse_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(warehouse_id)
        .bind(from.and_utc())
        .bind(until.and_utc())
        .fetch_all(&self.db)
        .await?;

        self.with_items(orders).await
    }

    pub async fn get(&self, warehouse_id: Uuid, order_id: Uuid) -> AppResult<Order> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, warehouse_id, created_at FROM orders WHERE id = $1 AND warehouse_id = $2",
        )
        .bind(order_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        self.with_items(vec![order])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Delete an order and put its quantities back on the shelf
    pub async fn delete(&self, warehouse_id: Uuid, order_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT warehouse_id FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        if owner != warehouse_id {
            return Err(AppError::Forbidden(
                "Order belongs to another warehouse".to_string(),
            ));
        }

        let lines = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM order_items WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, returned) in lines {
            let current = sqlx::query_scalar::<_, Decimal>(
                "SELECT quantity FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

            // Products deleted since the order was placed take their lines with them
            let Some(current) = current else { continue };

            let restored = stock::restore(current, returned);
            set_quantity(&mut tx, product_id, restored).await?;

            tracing::info!(
                %warehouse_id,
                %product_id,
                quantity = %returned,
                restored = %restored,
                "Stock restored from deleted order"
            );
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%order_id, %warehouse_id, "Order deleted");
        Ok(())
    }

    async fn with_items(&self, orders: Vec<OrderRow>) -> AppResult<Vec<Order>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{} WHERE oi.order_id = ANY($1) ORDER BY p.name",
            ITEM_SELECT
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let items: Vec<OrderItem> = items
                    .iter()
                    .filter(|item| item.order_id == order.id)
                    .cloned()
                    .collect();
                Order {
                    id: order.id,
                    warehouse_id: order.warehouse_id,
                    created_at: order.created_at,
                    total_price: order_total(&items),
                    items,
                }
            })
            .collect())
    }
}

async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
    product_id: Uuid,
) -> AppResult<LockedProduct> {
    sqlx::query_as::<_, LockedProduct>(
        r#"
        SELECT id, name, quantity, price, base_price, discount_price
        FROM products
        WHERE id = $1 AND warehouse_id = $2
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

pub(crate) async fn set_quantity(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: Decimal,
) -> AppResult<()> {
    sqlx::query("UPDATE products SET quantity = $2 WHERE id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: &str, price: &str) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            product_name: "Sugar".to_string(),
            unit: Unit::Kg,
            quantity: dec(quantity),
            base_price: Decimal::ZERO,
            price: dec(price),
        }
    }

    #[test]
    fn test_order_total_sums_lines() {
        let items = vec![item("2", "10.50"), item("0.5", "4")];
        assert_eq!(order_total(&items), dec("23"));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }
}
