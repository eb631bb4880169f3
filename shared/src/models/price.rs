//! Price models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Shop;

/// The active price for an item in a shop.
///
/// At most one record exists per (shop, item name). An item without a record
/// has no price, which is distinct from a price of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub id: String,
    pub shop: Shop,
    pub item_name: String,
    pub price: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One edited price from the price management screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEdit {
    pub item_name: String,
    pub price: Decimal,
}
