//! Stock ledger rules
//!
//! Every change to a product's on-hand quantity goes through these functions
//! so that a quantity can never become negative and a transfer never creates
//! or destroys stock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock classification derived from quantity and the configured minimum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Nothing left on hand
    Finished,
    /// Below the minimum quantity but not empty
    Low,
    Good,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Finished => "finished",
            ProductStatus::Low => "low",
            ProductStatus::Good => "good",
        }
    }

    /// Ordering used when grouping products in exports (good first)
    pub fn rank(&self) -> u8 {
        match self {
            ProductStatus::Good => 0,
            ProductStatus::Low => 1,
            ProductStatus::Finished => 2,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Finished => write!(f, "Finished"),
            ProductStatus::Low => write!(f, "Running low"),
            ProductStatus::Good => write!(f, "Good"),
        }
    }
}

/// Errors raised by ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    #[error("Insufficient stock: {available} available, {requested} requested")]
    Insufficient {
        available: Decimal,
        requested: Decimal,
    },
}

/// Classify a product by comparing its quantity to its minimum
pub fn classify(quantity: Decimal, min_quantity: Decimal) -> ProductStatus {
    if quantity.is_zero() {
        ProductStatus::Finished
    } else if quantity < min_quantity {
        ProductStatus::Low
    } else {
        ProductStatus::Good
    }
}

/// Products shown in the regular catalog listing
pub fn is_available(quantity: Decimal) -> bool {
    quantity > Decimal::ZERO
}

pub fn is_finished(quantity: Decimal) -> bool {
    quantity.is_zero()
}

/// Products that still have stock but are below their minimum
pub fn is_low(quantity: Decimal, min_quantity: Decimal) -> bool {
    quantity > Decimal::ZERO && quantity < min_quantity
}

/// Take `requested` out of `available`, returning the remaining quantity
pub fn withdraw(available: Decimal, requested: Decimal) -> Result<Decimal, StockError> {
    if requested <= Decimal::ZERO {
        return Err(StockError::NonPositiveQuantity);
    }
    if available < requested {
        return Err(StockError::Insufficient {
            available,
            requested,
        });
    }
    Ok(available - requested)
}

/// Put back a quantity that was previously withdrawn
pub fn restore(current: Decimal, returned: Decimal) -> Decimal {
    current + returned.max(Decimal::ZERO)
}

/// Move `quantity` from `source` to `destination`.
///
/// Returns the new `(source, destination)` pair. The sum of both sides is the
/// same before and after.
pub fn transfer(
    source: Decimal,
    destination: Decimal,
    quantity: Decimal,
) -> Result<(Decimal, Decimal), StockError> {
    let remaining = withdraw(source, quantity)?;
    Ok((remaining, destination + quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_classify_finished() {
        assert_eq!(classify(Decimal::ZERO, dec("5")), ProductStatus::Finished);
        assert_eq!(classify(dec("0.00"), Decimal::ZERO), ProductStatus::Finished);
    }

    #[test]
    fn test_classify_low() {
        assert_eq!(classify(dec("2"), dec("5")), ProductStatus::Low);
        assert_eq!(classify(dec("4.99"), dec("5")), ProductStatus::Low);
    }

    #[test]
    fn test_classify_good_at_minimum() {
        assert_eq!(classify(dec("5"), dec("5")), ProductStatus::Good);
        assert_eq!(classify(dec("12.5"), dec("5")), ProductStatus::Good);
    }

    #[test]
    fn test_withdraw_exact_amount_leaves_zero() {
        assert_eq!(withdraw(dec("3"), dec("3")), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_withdraw_insufficient() {
        assert_eq!(
            withdraw(dec("2"), dec("3")),
            Err(StockError::Insufficient {
                available: dec("2"),
                requested: dec("3"),
            })
        );
    }

    #[test]
    fn test_withdraw_rejects_zero_and_negative() {
        assert_eq!(withdraw(dec("2"), Decimal::ZERO), Err(StockError::NonPositiveQuantity));
        assert_eq!(withdraw(dec("2"), dec("-1")), Err(StockError::NonPositiveQuantity));
    }

    #[test]
    fn test_restore_ignores_negative() {
        assert_eq!(restore(dec("1"), dec("2")), dec("3"));
        assert_eq!(restore(dec("1"), dec("-2")), dec("1"));
    }

    #[test]
    fn test_transfer_moves_stock() {
        let (src, dst) = transfer(dec("10"), dec("4"), dec("6")).unwrap();
        assert_eq!(src, dec("4"));
        assert_eq!(dst, dec("10"));
    }

    #[test]
    fn test_listing_predicates() {
        assert!(is_available(dec("0.5")));
        assert!(!is_available(Decimal::ZERO));
        assert!(is_finished(Decimal::ZERO));
        assert!(is_low(dec("1"), dec("2")));
        assert!(!is_low(Decimal::ZERO, dec("2")));
        assert!(!is_low(dec("2"), dec("2")));
    }

    #[test]
    fn test_status_rank_orders_good_first() {
        let mut statuses = vec![ProductStatus::Finished, ProductStatus::Good, ProductStatus::Low];
        statuses.sort_by_key(|s| s.rank());
        assert_eq!(
            statuses,
            vec![ProductStatus::Good, ProductStatus::Low, ProductStatus::Finished]
        );
    }
}
