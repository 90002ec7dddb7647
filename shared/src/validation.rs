//! Validation utilities for the warehouse management platform

use rust_decimal::Decimal;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate username (3-100 chars, letters, digits and `_ . -`)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 100 {
        return Err("Username must be at most 100 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("Username may only contain letters, digits, '_', '.' and '-'");
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a display name (warehouse, category, product)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty");
    }
    if trimmed.chars().count() > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// [`validate_name`] for `#[validate(custom = "...")]` fields
pub fn validate_name_field(name: &str) -> Result<(), validator::ValidationError> {
    validate_name(name).map_err(|message| {
        let mut error = validator::ValidationError::new("name");
        error.message = Some(message.into());
        error
    })
}

/// Validate stock keeping unit code
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() {
        return Err("SKU cannot be empty");
    }
    if sku.len() > 100 {
        return Err("SKU must be at most 100 characters");
    }
    if sku.chars().any(char::is_whitespace) {
        return Err("SKU cannot contain whitespace");
    }
    Ok(())
}

// ============================================================================
// Numeric Validations
// ============================================================================

/// Decimal places kept by every stored quantity and price
pub const DECIMAL_PLACES: u32 = 2;

/// Largest magnitude a stored quantity or price can hold (`NUMERIC(12, 2)`)
pub const MAX_DECIMAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, DECIMAL_PLACES);

/// Validate that a quantity or price is storable without rounding
pub fn validate_decimal(value: Decimal) -> Result<(), &'static str> {
    if value.normalize().scale() > DECIMAL_PLACES {
        return Err("Values may have at most 2 decimal places");
    }
    if value.abs() > MAX_DECIMAL {
        return Err("Value is too large");
    }
    Ok(())
}

/// Validate a money amount on a cash transaction
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    validate_decimal(amount)
}

// ============================================================================
// Stock Movement Validations
// ============================================================================

/// Validate quantities of an order
pub fn validate_order_quantities(quantities: &[Decimal]) -> Result<(), &'static str> {
    if quantities.is_empty() {
        return Err("Order must contain at least one item");
    }
    for q in quantities {
        if *q <= Decimal::ZERO {
            return Err("Order quantities must be positive");
        }
        validate_decimal(*q)?;
    }
    Ok(())
}

/// Validate quantities of a transfer: non-empty, whole numbers, at least 1
pub fn validate_transfer_quantities(quantities: &[Decimal]) -> Result<(), &'static str> {
    if quantities.is_empty() {
        return Err("Items list cannot be empty");
    }
    for q in quantities {
        if *q < Decimal::ONE {
            return Err("Transfer quantities must be at least 1");
        }
        if !q.fract().is_zero() {
            return Err("Transfer quantities must be whole numbers");
        }
        validate_decimal(*q)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("store_admin").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("s3cretpass").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Main store").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_name_field_carries_message() {
        assert!(validate_name_field(" Shelf A ").is_ok());
        let err = validate_name_field(" \t ").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Name cannot be empty"));
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SKU-001").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("SKU 001").is_err());
    }

    #[test]
    fn test_validate_order_quantities() {
        assert!(validate_order_quantities(&[dec("1.5"), dec("2")]).is_ok());
        assert!(validate_order_quantities(&[]).is_err());
        assert!(validate_order_quantities(&[dec("0")]).is_err());
    }

    #[test]
    fn test_validate_transfer_quantities() {
        assert!(validate_transfer_quantities(&[dec("1"), dec("10")]).is_ok());
        assert!(validate_transfer_quantities(&[]).is_err());
        assert!(validate_transfer_quantities(&[dec("0")]).is_err());
        assert!(validate_transfer_quantities(&[dec("1.5")]).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec("0.01")).is_ok());
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(dec("0.001")).is_err());
    }

    #[test]
    fn test_validate_decimal() {
        assert_eq!(MAX_DECIMAL, dec("9999999999.99"));
        assert!(validate_decimal(dec("12.50")).is_ok());
        assert!(validate_decimal(dec("12.5000")).is_ok());
        assert!(validate_decimal(MAX_DECIMAL).is_ok());
        assert!(validate_decimal(dec("0.005")).is_err());
        assert!(validate_decimal(dec("10000000000")).is_err());
        assert!(validate_decimal(dec("-10000000000")).is_err());
    }
}
