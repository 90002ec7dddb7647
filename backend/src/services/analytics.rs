//! Sales analytics and data export

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{cash_net, line_total, MonthlySales, SalesSummary};
use shared::types::DateRange;

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// An order line sold within a reporting window
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SoldItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub base_price: Decimal,
    pub price: Decimal,
    pub ordered_at: DateTime<Utc>,
}

/// Sold lines in a window with their totals
#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub total_price: Decimal,
    pub base_price: Decimal,
    pub profit_price: Decimal,
    pub items: Vec<SoldItem>,
}

impl SalesReport {
    fn new(range: DateRange, items: Vec<SoldItem>) -> Self {
        let (total_price, base_price) = items.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(total, base), item| {
                (
                    total + line_total(item.quantity, item.price),
                    base + line_total(item.quantity, item.base_price),
                )
            },
        );

        Self {
            start_date: range.start,
            end_date: range.end,
            total_price,
            base_price,
            profit_price: total_price - base_price,
            items,
        }
    }
}

#[derive(Debug, FromRow)]
struct MonthRow {
    year: i32,
    month: i32,
    total_price: Decimal,
    base_price: Decimal,
}

impl AnalyticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Lines of orders placed within `range`, newest first
    pub async fn sales(&self, warehouse_id: Uuid, range: DateRange) -> AppResult<SalesReport> {
        let (from, until) = range.bounds();

        let items = sqlx::query_as::<_, SoldItem>(
            r#"
            SELECT oi.order_id, oi.product_id, p.name AS product_name,
                   oi.quantity, oi.base_price, oi.price, o.created_at AS ordered_at
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE o.warehouse_id = $1 AND o.created_at >= $2 AND o.created_at < $3
            ORDER BY o.created_at DESC, p.name
            "#,
        )
        .bind(warehouse_id)
        .bind(from.and_utc())
        .bind(until.and_utc())
        .fetch_all(&self.db)
        .await?;

        Ok(SalesReport::new(range, items))
    }

    /// Stock value on hand plus net cash flow
    pub async fn summary(&self, warehouse_id: Uuid) -> AppResult<SalesSummary> {
        let (total_price, base_price): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN discount_price > 0 THEN discount_price ELSE price END * quantity), 0),
                COALESCE(SUM(base_price * quantity), 0)
            FROM products
            WHERE warehouse_id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        let (income, expenses): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(price) FILTER (WHERE status = 'intro'), 0),
                COALESCE(SUM(price) FILTER (WHERE status = 'exit'), 0)
            FROM transactions
            WHERE warehouse_id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(SalesSummary::new(
            total_price,
            base_price,
            cash_net(income, expenses),
        ))
    }

    /// Sales per calendar month from the prices captured on each order line
    pub async fn monthly_report(&self, warehouse_id: Uuid) -> AppResult<Vec<MonthlySales>> {
        let rows = sqlx::query_as::<_, MonthRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM o.created_at AT TIME ZONE 'UTC')::int AS year,
                EXTRACT(MONTH FROM o.created_at AT TIME ZONE 'UTC')::int AS month,
                COALESCE(SUM(oi.price * oi.quantity), 0) AS total_price,
                COALESCE(SUM(oi.base_price * oi.quantity), 0) AS base_price
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.warehouse_id = $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                MonthlySales::new(
                    row.year,
                    row.month.unsigned_abs(),
                    row.total_price,
                    row.base_price,
                )
            })
            .collect())
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sold(quantity: &str, base_price: &str, price: &str) -> SoldItem {
        SoldItem {
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Tea".to_string(),
            quantity: dec(quantity),
            base_price: dec(base_price),
            price: dec(price),
            ordered_at: Utc::now(),
        }
    }

    #[test]
    fn test_sales_report_totals() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let report = SalesReport::new(
            DateRange::day(day),
            vec![sold("2", "3", "5"), sold("1.5", "4", "6")],
        );

        assert_eq!(report.total_price, dec("19"));
        assert_eq!(report.base_price, dec("12"));
        assert_eq!(report.profit_price, dec("7"));
        assert_eq!(report.start_date, day);
        assert_eq!(report.end_date, day);
    }

    #[test]
    fn test_empty_sales_report() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let report = SalesReport::new(DateRange::month_of(day), Vec::new());
        assert_eq!(report.total_price, Decimal::ZERO);
        assert_eq!(report.profit_price, Decimal::ZERO);
        assert_eq!(report.end_date, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
    }
}
