//! WebAssembly module for Sommelier Analytics
//!
//! Provides client-side computation for:
//! - Wine, sale and restaurant form validation
//! - Margin, markup and price recommendations
//! - Stock runway projection

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// What the form validators hand back to JavaScript
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum FormOutcome<T> {
    Valid { value: T },
    Invalid { errors: FieldErrors },
}

/// Form values arrive as a JSON object; numbers and booleans are taken as
/// the text the user would have typed, `null` as an empty field
fn form_fields(form_json: &str) -> Result<FormFields, JsValue> {
    let object: Map<String, Value> = serde_json::from_str(form_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid form JSON: {}", e)))?;

    Ok(object
        .into_iter()
        .filter_map(|(name, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return None,
            };
            Some((name, text))
        })
        .collect())
}

fn outcome<T: Serialize>(result: Result<T, FieldErrors>) -> Result<String, JsValue> {
    let outcome = match result {
        Ok(value) => FormOutcome::Valid { value },
        Err(errors) => FormOutcome::Invalid { errors },
    };
    serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

/// Validate the add-wine form
#[wasm_bindgen]
pub fn validate_wine_form(form_json: &str) -> Result<String, JsValue> {
    outcome(WineFormData::from_fields(&form_fields(form_json)?))
}

/// Validate the record-sale form
#[wasm_bindgen]
pub fn validate_sale_form(form_json: &str) -> Result<String, JsValue> {
    outcome(SaleFormData::from_fields(&form_fields(form_json)?))
}

/// Validate the restaurant sign-up form
#[wasm_bindgen]
pub fn validate_restaurant_form(form_json: &str) -> Result<String, JsValue> {
    outcome(RestaurantFormData::from_fields(&form_fields(form_json)?))
}

/// Profit margin as a percentage of price; `undefined` without a cost
#[wasm_bindgen]
pub fn calculate_profit_margin(price: f64, cost: f64) -> Option<f64> {
    to_f64(profit_margin_percent(decimal(price), decimal(cost)))
}

/// Markup as a percentage of cost
#[wasm_bindgen]
pub fn calculate_markup(price: f64, cost: f64) -> Option<f64> {
    to_f64(markup_percent(decimal(price), decimal(cost)))
}

/// Line total shown while the sale form is filled in; `undefined` when the
/// amount is out of range
#[wasm_bindgen]
pub fn calculate_sale_total(unit_price: f64, quantity: i32) -> Option<f64> {
    to_f64(decimal(unit_price).checked_mul(Decimal::from(quantity.max(0))))
}

/// Suggested price when the margin is under target
#[wasm_bindgen]
pub fn recommend_price(price: f64, cost: f64) -> Option<f64> {
    to_f64(recommended_price(decimal(price), decimal(cost)))
}

/// Days of stock left at the 30-day sales rate; `undefined` if not selling
#[wasm_bindgen]
pub fn days_until_stockout(inventory: i32, bottles_sold_30_days: i32) -> Option<f64> {
    InventoryHealth::assess(Default::default(), "", inventory, i64::from(bottles_sold_30_days))
        .days_until_stockout
        .map(|days| days as f64)
}
