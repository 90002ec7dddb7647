//! Input validation tests
//!
//! Tests for account, catalog and movement inputs plus date ranges used by
//! the order and analytics queries.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::types::DateRange;
use shared::{
    subscription_dates, validate_amount, validate_decimal, validate_email, validate_name,
    validate_order_quantities, validate_password, validate_pricing, validate_quantities,
    validate_sku, validate_transfer_quantities, validate_username, Subscription, UserRole,
    MAX_DECIMAL,
};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_usernames() {
        assert!(validate_username("store.keeper_1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("owner@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("s3cure-pass").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_catalog_fields() {
        assert!(validate_name("  Basmati rice ").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_sku("RICE-001").is_ok());
        assert!(validate_sku("RICE 001").is_err());
        assert!(validate_sku("").is_err());
    }

    #[test]
    fn test_order_quantities() {
        assert!(validate_order_quantities(&[dec("0.5"), dec("2")]).is_ok());
        assert!(validate_order_quantities(&[]).is_err());
        assert!(validate_order_quantities(&[dec("1"), Decimal::ZERO]).is_err());
    }

    #[test]
    fn test_sub_cent_values_are_rejected() {
        assert!(validate_order_quantities(&[dec("0.005")]).is_err());
        assert!(validate_order_quantities(&[dec("0.004")]).is_err());
        assert!(validate_order_quantities(&[dec("2.50"), dec("1.125")]).is_err());
        assert!(validate_amount(dec("0.001")).is_err());
        assert!(validate_amount(dec("19.99")).is_ok());
        assert!(validate_pricing(dec("10.001"), dec("5"), Decimal::ZERO).is_err());
        assert!(validate_pricing(dec("10"), dec("5"), dec("7.999")).is_err());
        assert!(validate_quantities(dec("5"), dec("0.015")).is_err());
    }

    #[test]
    fn test_values_beyond_column_range_are_rejected() {
        let too_large = MAX_DECIMAL + dec("0.01");
        assert!(validate_decimal(MAX_DECIMAL).is_ok());
        assert!(validate_decimal(too_large).is_err());
        assert!(validate_order_quantities(&[too_large]).is_err());
        assert!(validate_transfer_quantities(&[dec("10000000000")]).is_err());
        assert!(validate_amount(too_large).is_err());
        assert!(validate_quantities(too_large, Decimal::ZERO).is_err());
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        assert!(validate_decimal(dec("3.5000")).is_ok());
        assert!(validate_order_quantities(&[dec("1.100")]).is_ok());
    }

    #[test]
    fn test_transfer_quantities_must_be_whole() {
        assert!(validate_transfer_quantities(&[dec("1"), dec("12")]).is_ok());
        assert!(validate_transfer_quantities(&[dec("1.5")]).is_err());
        assert!(validate_transfer_quantities(&[Decimal::ZERO]).is_err());
        assert!(validate_transfer_quantities(&[]).is_err());
    }

    #[test]
    fn test_date_range_parsing() {
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        assert!(range.contains(date(2025, 1, 15)));
        assert!(!range.contains(date(2025, 2, 1)));
        assert!(DateRange::parse("2025-02-01", "2025-01-01").is_err());
        assert!(DateRange::parse("01/01/2025", "2025-01-31").is_err());
    }

    #[test]
    fn test_range_bounds_cover_whole_end_day() {
        let (from, until) = DateRange::day(date(2025, 6, 30)).bounds();
        assert_eq!(from.date(), date(2025, 6, 30));
        assert_eq!(until.date(), date(2025, 7, 1));
    }

    #[test]
    fn test_month_of_december() {
        let range = DateRange::month_of(date(2024, 12, 17));
        assert_eq!(range.start, date(2024, 12, 1));
        assert_eq!(range.end, date(2024, 12, 31));
    }

    #[test]
    fn test_company_subscription() {
        let sub = Subscription::starting(date(2025, 1, 1), 30);
        assert!(!sub.is_expired(date(2025, 1, 31)));
        assert!(sub.is_expired(date(2025, 2, 1)));

        assert_eq!(
            subscription_dates(UserRole::User, Some(date(2025, 1, 1)), None, date(2025, 1, 1)),
            (None, None)
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A range either validates with start <= end or is rejected
        #[test]
        fn prop_date_range_ordering(a in date_strategy(), b in date_strategy()) {
            match DateRange::new(a, b) {
                Ok(range) => {
                    prop_assert!(range.start <= range.end);
                    prop_assert!(range.contains(a));
                    prop_assert!(range.contains(b));
                }
                Err(_) => prop_assert!(a > b),
            }
        }

        /// The month range always contains its anchor date
        #[test]
        fn prop_month_contains_date(d in date_strategy()) {
            let range = DateRange::month_of(d);
            prop_assert!(range.contains(d));
            prop_assert_eq!(range.start.format("%Y-%m").to_string(), d.format("%Y-%m").to_string());
        }

        /// Whole positive quantities always pass transfer validation
        #[test]
        fn prop_whole_transfer_quantities_accepted(
            quantities in prop::collection::vec(1i64..100_000, 1..10)
        ) {
            let quantities: Vec<Decimal> = quantities.into_iter().map(Decimal::from).collect();
            prop_assert!(validate_transfer_quantities(&quantities).is_ok());
        }

        /// Anything with a third significant decimal place is rejected
        #[test]
        fn prop_three_decimal_places_rejected(
            whole in 0i64..1_000_000,
            thousandths in 1i64..10
        ) {
            let value = Decimal::new(whole * 1000 + thousandths, 3);
            prop_assert!(validate_decimal(value).is_err());
            prop_assert!(validate_order_quantities(&[value]).is_err());
            prop_assert!(validate_amount(value).is_err());
        }

        /// Positive cent amounts are always storable
        #[test]
        fn prop_cent_amounts_accepted(cents in 1i64..1_000_000_000) {
            let value = Decimal::new(cents, 2);
            prop_assert!(validate_decimal(value).is_ok());
            prop_assert!(validate_order_quantities(&[value]).is_ok());
            prop_assert!(validate_amount(value).is_ok());
        }

        /// Generated usernames in the allowed alphabet are accepted
        #[test]
        fn prop_valid_usernames(username in "[a-zA-Z0-9_.-]{3,100}") {
            prop_assert!(validate_username(&username).is_ok());
        }
    }
}
