//! WebAssembly module for the bakery inventory front end
//!
//! Provides client-side computation for:
//! - Derived bakery and beverage rows, re-evaluated on every edit
//! - The end-of-day cash equation
//! - Input validation before anything is sent
//! - The local cash book: recording a day's closing and looking up the
//!   next day's opening balance

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::cash::{CashBook, CashEquation};
use shared::derived::{derive_bakery_row as derive_bakery, derive_beverage_row as derive_beverage};
use shared::derived::{BakeryInputs, BeverageInputs};
use shared::models::{MovementField, Shop, UnknownShop};
use shared::validation::{parse_date, validate_movement as check_movement};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("bakery-wasm loaded"));
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn decimal(value: f64, field: &str) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("{} is not a valid amount", field))
}

// ============================================================================
// Derived rows
// ============================================================================

fn bakery_row_json(inputs_json: &str) -> Result<String, String> {
    let inputs: BakeryInputs =
        serde_json::from_str(inputs_json).map_err(|e| format!("Invalid row JSON: {}", e))?;
    serde_json::to_string(&derive_bakery(&inputs)).map_err(|e| e.to_string())
}

fn beverage_row_json(inputs_json: &str) -> Result<String, String> {
    let inputs: BeverageInputs =
        serde_json::from_str(inputs_json).map_err(|e| format!("Invalid row JSON: {}", e))?;
    serde_json::to_string(&derive_beverage(&inputs)).map_err(|e| e.to_string())
}

/// Derive a bakery row from `{ itemName, previousDayRemaining, stored, pending, price }`
#[wasm_bindgen]
pub fn derive_bakery_row(inputs_json: &str) -> Result<String, JsValue> {
    bakery_row_json(inputs_json).map_err(js_error)
}

/// Derive a beverage row from `{ beverage, previousDayCount, storedCount, pendingCount, price }`
#[wasm_bindgen]
pub fn derive_beverage_row(inputs_json: &str) -> Result<String, JsValue> {
    beverage_row_json(inputs_json).map_err(js_error)
}

// ============================================================================
// Cash
// ============================================================================

fn cash_equation_json(opening: f64, selling: f64, closing: f64, deposit: f64) -> Result<String, String> {
    let equation = CashEquation::compute(
        decimal(opening, "Opening balance")?,
        decimal(selling, "Selling value")?,
        decimal(closing, "Closing balance")?,
        decimal(deposit, "Deposit")?,
    );
    serde_json::to_string(&equation).map_err(|e| e.to_string())
}

/// Evaluate `opening + selling - closing` against the deposit
#[wasm_bindgen]
pub fn cash_equation(opening: f64, selling: f64, closing: f64, deposit: f64) -> Result<String, JsValue> {
    cash_equation_json(opening, selling, closing, deposit).map_err(js_error)
}

fn opening_from_book(book_json: &str, shop: &str, date: &str) -> Result<Option<String>, String> {
    let book: CashBook =
        serde_json::from_str(book_json).map_err(|e| format!("Invalid cash book JSON: {}", e))?;
    let shop: Shop = shop.parse().map_err(|e: UnknownShop| e.to_string())?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    Ok(book.opening_for(shop, date).map(|d| d.to_string()))
}

/// Yesterday's recorded closing balance for the shop, if the cash book has one
#[wasm_bindgen]
pub fn opening_balance_for(book_json: &str, shop: &str, date: &str) -> Result<Option<String>, JsValue> {
    opening_from_book(book_json, shop, date).map_err(js_error)
}

fn record_closing_in_book(book_json: &str, shop: &str, date: &str, closing: f64) -> Result<String, String> {
    let mut book: CashBook = if book_json.trim().is_empty() {
        CashBook::default()
    } else {
        serde_json::from_str(book_json).map_err(|e| format!("Invalid cash book JSON: {}", e))?
    };
    let shop: Shop = shop.parse().map_err(|e: UnknownShop| e.to_string())?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    book.record_closing(shop, date, decimal(closing, "Closing balance")?);
    serde_json::to_string(&book).map_err(|e| e.to_string())
}

/// Record the shop's closing balance for the day; returns the updated cash book JSON
#[wasm_bindgen]
pub fn record_closing(book_json: &str, shop: &str, date: &str, closing: f64) -> Result<String, JsValue> {
    record_closing_in_book(book_json, shop, date, closing).map_err(js_error)
}

// ============================================================================
// Validation and fixed lists
// ============================================================================

/// Check a movement count before it is recorded; returns the accepted value
#[wasm_bindgen]
pub fn validate_movement(value: i32) -> Result<u32, JsValue> {
    check_movement(MovementField::MorningIn, i64::from(value)).map_err(|e| js_error(e.message))
}

/// The eight shop names, in display order
#[wasm_bindgen]
pub fn shop_names() -> js_sys::Array {
    Shop::ALL
        .iter()
        .map(|shop| JsValue::from_str(shop.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bakery_row_json() {
        let json = bakery_row_json(
            r#"{"itemName":"Bun","previousDayRemaining":10,"pending":{"morningTime":20},"price":"25"}"#,
        )
        .unwrap();
        let row: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(row["startingInventory"], 30);
        assert_eq!(row["sellingQuantity"], 30);
        assert_eq!(row["hasChanges"], true);
    }

    #[test]
    fn test_beverage_row_json_clamps_reset() {
        let json = beverage_row_json(
            r#"{"beverage":"Nescafe","previousDayCount":100,"storedCount":80}"#,
        )
        .unwrap();
        let row: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(row["sellingQuantity"], 0);
        assert!(row["totalValue"].is_null());
    }

    #[test]
    fn test_invalid_json() {
        assert!(bakery_row_json("{").is_err());
    }

    #[test]
    fn test_cash_equation_json() {
        let json = cash_equation_json(1000.0, 3475.0, 400.0, 4000.0).unwrap();
        let eq: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(eq["status"], "deficit");
    }

    #[test]
    fn test_opening_from_book() {
        let mut book = CashBook::default();
        let day = parse_date("2024-02-09").unwrap();
        book.record_closing(Shop::Depanama, day, Decimal::new(475, 0));
        let json = serde_json::to_string(&book).unwrap();

        assert_eq!(
            opening_from_book(&json, "Depanama", "2024-02-10").unwrap(),
            Some("475".to_string())
        );
        assert_eq!(opening_from_book(&json, "Depanama", "2024-02-11").unwrap(), None);
        assert!(opening_from_book(&json, "Colombo", "2024-02-10").is_err());
    }

    fn opening(book_json: &str, shop: &str, date: &str) -> Option<Decimal> {
        opening_from_book(book_json, shop, date)
            .unwrap()
            .map(|s| s.parse().unwrap())
    }

    #[test]
    fn test_recorded_closing_opens_next_day() {
        let json = record_closing_in_book("{}", "Depanama", "2024-02-09", 475.0).unwrap();
        assert_eq!(opening(&json, "Depanama", "2024-02-10"), Some(Decimal::new(475, 0)));

        // Later recordings keep the earlier days
        let json = record_closing_in_book(&json, "Koswatta", "2024-02-10", 120.5).unwrap();
        assert_eq!(opening(&json, "Koswatta", "2024-02-11"), Some(Decimal::new(1205, 1)));
        assert_eq!(opening(&json, "Depanama", "2024-02-10"), Some(Decimal::new(475, 0)));

        assert!(record_closing_in_book("", "Depanama", "2024-02-09", 10.0).is_ok());
        assert!(record_closing_in_book("{", "Depanama", "2024-02-09", 10.0).is_err());
        assert!(record_closing_in_book("{}", "Depanama", "09/02/2024", 10.0).is_err());
    }
}
