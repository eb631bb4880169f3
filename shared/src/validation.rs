//! Validation utilities for the bakery inventory platform
//!
//! Everything here runs before a write is issued. A rejected input never
//! reaches the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{is_beverage_name, MovementField, ShopItem};

/// A rejected user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Set when the input collides with an existing record
    pub duplicate: bool,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            duplicate: false,
        }
    }

    pub fn duplicate(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            duplicate: true,
        }
    }
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Trim an item name and check it is usable in a shop catalog
pub fn validate_item_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("itemName", "Please enter an item name"));
    }
    if is_beverage_name(trimmed) {
        return Err(ValidationError::new(
            "itemName",
            format!("\"{}\" is tracked as a beverage and cannot be added as an item", trimmed),
        ));
    }
    Ok(trimmed.to_string())
}

/// Reject `name` if another item in `catalog` already uses it, ignoring case.
/// `exclude_id` is the item being renamed, if any.
pub fn ensure_unique_name(
    catalog: &[ShopItem],
    name: &str,
    exclude_id: Option<&str>,
) -> Result<(), ValidationError> {
    let wanted = name.to_lowercase();
    let clash = catalog.iter().any(|item| {
        Some(item.id.as_str()) != exclude_id && item.item_name.to_lowercase() == wanted
    });
    if clash {
        return Err(ValidationError::duplicate(
            "itemName",
            "An item with this name already exists for this shop",
        ));
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a movement count entered by staff
pub fn validate_movement(field: MovementField, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field.key(), "Negative values are not allowed"));
    }
    u32::try_from(value).map_err(|_| ValidationError::new(field.key(), "Value is too large"))
}

/// Validate a beverage counter reading
pub fn validate_counter(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new("todayCount", "Negative values are not allowed"));
    }
    u32::try_from(value).map_err(|_| ValidationError::new("todayCount", "Value is too large"))
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date", format!("Invalid date: {}", value)))
}

// ============================================================================
// Price Validations
// ============================================================================

/// Validate a price edit. Zero means "no edit" and yields `None`.
pub fn validate_price(price: Decimal) -> Result<Option<Decimal>, ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::new("price", "Price cannot be negative"));
    }
    if price.is_zero() {
        return Ok(None);
    }
    Ok(Some(price))
}

/// Validate a cash amount (opening, closing, deposit)
pub fn validate_amount(field: &str, amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::new(field, "Amount cannot be negative"));
    }
    Ok(amount)
}
