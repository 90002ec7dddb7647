//! Sales analytics models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock and cash summary for a warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Σ effective price × quantity over products on hand
    pub total_price: Decimal,
    /// Σ base price × quantity over products on hand
    pub base_price: Decimal,
    pub profit_price: Decimal,
}

impl SalesSummary {
    /// `cash_net` is income minus expenses from cash transactions
    pub fn new(total_price: Decimal, base_price: Decimal, cash_net: Decimal) -> Self {
        Self {
            total_price,
            base_price,
            profit_price: total_price - base_price + cash_net,
        }
    }
}

/// Sales for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub total_price: Decimal,
    pub base_price: Decimal,
    pub profit_price: Decimal,
}

impl MonthlySales {
    pub fn new(year: i32, month: u32, total_price: Decimal, base_price: Decimal) -> Self {
        Self {
            year,
            month,
            total_price,
            base_price,
            profit_price: total_price - base_price,
        }
    }
}

/// Net cash flow from income and expense totals
pub fn cash_net(income: Decimal, expenses: Decimal) -> Decimal {
    income - expenses
}

/// Value of an order line
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity * unit_price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_profit_includes_cash() {
        let summary = SalesSummary::new(Decimal::from(1000), Decimal::from(600), Decimal::from(-50));
        assert_eq!(summary.profit_price, Decimal::from(350));
    }

    #[test]
    fn test_monthly_profit_is_total_minus_base() {
        let month = MonthlySales::new(2025, 3, Decimal::from(500), Decimal::from(320));
        assert_eq!(month.profit_price, Decimal::from(180));
    }

    #[test]
    fn test_cash_net() {
        assert_eq!(cash_net(Decimal::from(200), Decimal::from(75)), Decimal::from(125));
    }
}
