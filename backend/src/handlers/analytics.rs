//! Analytics handlers for sales reports and summaries

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, CurrentWarehouse};
use crate::models::{MonthlySales, SalesSummary};
use crate::services::analytics::SalesReport;
use crate::services::AnalyticsService;
use crate::AppState;
use shared::types::DateRange;

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both required
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn into_range(self) -> AppResult<DateRange> {
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(AppError::validation(
                "start_date",
                "Both start_date and end_date are required",
            ));
        };
        DateRange::parse(&start, &end).map_err(|msg| AppError::validation("start_date", msg))
    }
}

/// Items sold today
pub async fn get_daily_sales(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<SalesReport>> {
    let service = AnalyticsService::new(state.db);
    let today = Utc::now().date_naive();
    let report = service.sales(warehouse_id, DateRange::day(today)).await?;
    Ok(Json(report))
}

/// Items sold this calendar month
pub async fn get_monthly_sales(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<SalesReport>> {
    let service = AnalyticsService::new(state.db);
    let today = Utc::now().date_naive();
    let report = service
        .sales(warehouse_id, DateRange::month_of(today))
        .await?;
    Ok(Json(report))
}

/// Items sold within a date range
pub async fn get_sales_in_range(
    State(state): State<AppState>,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<SalesReport>> {
    let range = query.into_range()?;
    let service = AnalyticsService::new(state.db);
    let report = service.sales(warehouse_id, range).await?;
    Ok(Json(report))
}

/// Stock value and cash summary
pub async fn get_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<SalesSummary>> {
    current_user.0.require_superuser()?;
    let service = AnalyticsService::new(state.db);
    let summary = service.summary(warehouse_id).await?;
    Ok(Json(summary))
}

/// Monthly sales report
pub async fn get_monthly_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CurrentWarehouse(warehouse_id): CurrentWarehouse,
) -> AppResult<Json<Vec<MonthlySales>>> {
    current_user.0.require_superuser()?;
    let service = AnalyticsService::new(state.db);
    let report = service.monthly_report(warehouse_id).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_query_requires_both_dates() {
        let query = DateRangeQuery {
            start_date: Some("2025-01-01".into()),
            end_date: None,
        };
        assert!(matches!(query.into_range(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_range_query_rejects_reversed_dates() {
        let query = DateRangeQuery {
            start_date: Some("2025-02-01".into()),
            end_date: Some("2025-01-01".into()),
        };
        assert!(query.into_range().is_err());
    }

    #[test]
    fn test_range_query_parses() {
        let query = DateRangeQuery {
            start_date: Some("2025-01-01".into()),
            end_date: Some("2025-01-31".into()),
        };
        let range = query.into_range().unwrap();
        assert_eq!(range.end.to_string(), "2025-01-31");
    }
}
