//! Product catalog models and pricing rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::validate_decimal;

/// Unit a product is measured in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Kg,
    L,
    Pcs,
    M,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::L => "l",
            Unit::Pcs => "pcs",
            Unit::M => "m",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Kg => write!(f, "Kilogram"),
            Unit::L => write!(f, "Litre"),
            Unit::Pcs => write!(f, "Piece"),
            Unit::M => write!(f, "Metre"),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "kg" => Ok(Unit::Kg),
            "l" => Ok(Unit::L),
            "pcs" => Ok(Unit::Pcs),
            "m" => Ok(Unit::M),
            other => Err(format!("unknown unit: {}", other)),
        }
    }
}

/// Price a product actually sells for: the discount when one is set
pub fn effective_price(price: Decimal, discount_price: Decimal) -> Decimal {
    if discount_price > Decimal::ZERO {
        discount_price
    } else {
        price
    }
}

/// Money tied up in the stock on hand, at purchase price
pub fn investment(quantity: Decimal, base_price: Decimal) -> Decimal {
    quantity * base_price
}

/// Expected takings if the stock on hand sells at its effective price
pub fn cash_value(quantity: Decimal, price: Decimal, discount_price: Decimal) -> Decimal {
    quantity * effective_price(price, discount_price)
}

/// Validate the price triple of a product
pub fn validate_pricing(
    price: Decimal,
    base_price: Decimal,
    discount_price: Decimal,
) -> Result<(), &'static str> {
    if price < Decimal::ZERO || base_price < Decimal::ZERO || discount_price < Decimal::ZERO {
        return Err("Prices cannot be negative");
    }
    validate_decimal(price)?;
    validate_decimal(base_price)?;
    validate_decimal(discount_price)?;
    if price < base_price {
        return Err("Selling price cannot be below the base price");
    }
    if discount_price > price {
        return Err("Discount price cannot exceed the selling price");
    }
    Ok(())
}

/// Validate stock counters supplied on create/update
pub fn validate_quantities(quantity: Decimal, min_quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    if min_quantity < Decimal::ZERO {
        return Err("Minimum quantity cannot be negative");
    }
    validate_decimal(quantity)?;
    validate_decimal(min_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        assert_eq!(effective_price(dec("100"), dec("80")), dec("80"));
        assert_eq!(effective_price(dec("100"), Decimal::ZERO), dec("100"));
    }

    #[test]
    fn test_investment_and_cash_value() {
        assert_eq!(investment(dec("3"), dec("10.50")), dec("31.50"));
        assert_eq!(cash_value(dec("3"), dec("20"), Decimal::ZERO), dec("60"));
        assert_eq!(cash_value(dec("3"), dec("20"), dec("15")), dec("45"));
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(dec("20"), dec("10"), dec("15")).is_ok());
        assert!(validate_pricing(dec("20"), dec("20"), Decimal::ZERO).is_ok());
        assert!(validate_pricing(dec("9"), dec("10"), Decimal::ZERO).is_err());
        assert!(validate_pricing(dec("20"), dec("10"), dec("21")).is_err());
        assert!(validate_pricing(dec("20"), dec("-1"), Decimal::ZERO).is_err());
        assert!(validate_pricing(dec("20.005"), dec("10"), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_quantities_scale() {
        assert!(validate_quantities(dec("4.25"), dec("1")).is_ok());
        assert!(validate_quantities(dec("4.255"), dec("1")).is_err());
        assert!(validate_quantities(dec("4"), dec("0.001")).is_err());
    }

    #[test]
    fn test_unit_round_trip_through_string() {
        for unit in [Unit::Kg, Unit::L, Unit::Pcs, Unit::M] {
            assert_eq!(Unit::try_from(unit.as_str().to_string()), Ok(unit));
        }
        assert!(Unit::try_from("box".to_string()).is_err());
    }
}
