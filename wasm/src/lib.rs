//! WebAssembly module for the Warehouse Management Platform
//!
//! Provides client-side computation for:
//! - Stock status badges
//! - Effective price, investment and cash value of stock on hand
//! - Price validation before a product form is submitted
//! - Order totals while an order is being composed

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("warehouse-wasm initialised"));
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// Stock status (`finished`, `low` or `good`) for a quantity and its minimum
#[wasm_bindgen]
pub fn product_status(quantity: f64, min_quantity: f64) -> String {
    classify(to_decimal(quantity), to_decimal(min_quantity))
        .as_str()
        .to_string()
}

/// Price a product sells for, preferring a set discount
#[wasm_bindgen]
pub fn effective_price(price: f64, discount_price: f64) -> f64 {
    to_f64(shared::effective_price(
        to_decimal(price),
        to_decimal(discount_price),
    ))
}

/// Expected takings for the stock on hand
#[wasm_bindgen]
pub fn cash_value(quantity: f64, price: f64, discount_price: f64) -> f64 {
    to_f64(shared::cash_value(
        to_decimal(quantity),
        to_decimal(price),
        to_decimal(discount_price),
    ))
}

/// Money tied up in the stock on hand
#[wasm_bindgen]
pub fn investment(quantity: f64, base_price: f64) -> f64 {
    to_f64(shared::investment(to_decimal(quantity), to_decimal(base_price)))
}

/// Check a price triple; throws with the reason when invalid
#[wasm_bindgen]
pub fn validate_product_pricing(
    price: f64,
    base_price: f64,
    discount_price: f64,
) -> Result<(), JsValue> {
    validate_pricing(
        to_decimal(price),
        to_decimal(base_price),
        to_decimal(discount_price),
    )
    .map_err(js_error)
}

#[derive(Debug, Deserialize)]
struct DraftLine {
    quantity: Decimal,
    price: Decimal,
    #[serde(default)]
    discount_price: Decimal,
}

fn draft_total(items_json: &str) -> Result<Decimal, String> {
    let lines: Vec<DraftLine> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;

    let quantities: Vec<Decimal> = lines.iter().map(|line| line.quantity).collect();
    validate_order_quantities(&quantities)?;

    Ok(lines
        .iter()
        .map(|line| {
            line_total(
                line.quantity,
                shared::effective_price(line.price, line.discount_price),
            )
        })
        .sum())
}

/// Total of a draft order given as `[{"quantity", "price", "discount_price"?}]`
#[wasm_bindgen]
pub fn order_total(items_json: &str) -> Result<f64, JsValue> {
    draft_total(items_json)
        .map(to_f64)
        .map_err(|message| js_error(&message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status() {
        assert_eq!(product_status(0.0, 5.0), "finished");
        assert_eq!(product_status(2.0, 5.0), "low");
        assert_eq!(product_status(5.0, 5.0), "good");
    }

    #[test]
    fn test_price_helpers() {
        assert_eq!(effective_price(10.0, 8.0), 8.0);
        assert_eq!(effective_price(10.0, 0.0), 10.0);
        assert_eq!(cash_value(3.0, 10.0, 8.0), 24.0);
        assert_eq!(investment(3.0, 6.5), 19.5);
    }

    #[test]
    fn test_draft_total_uses_discounts() {
        let json = r#"[
            {"quantity": 2, "price": 10, "discount_price": 8},
            {"quantity": "1.5", "price": "4"}
        ]"#;
        assert_eq!(draft_total(json).unwrap(), Decimal::from(22));
    }

    #[test]
    fn test_draft_total_rejects_empty_and_bad_input() {
        assert!(draft_total("[]").is_err());
        assert!(draft_total("not json").is_err());
        assert!(draft_total(r#"[{"quantity": 0, "price": 1}]"#).is_err());
    }
}
