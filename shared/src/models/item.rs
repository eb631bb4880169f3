//! Catalog item models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Shop;

/// A bakery item configured for one shop.
///
/// `order` is the sell-sequence sort key. It is unique within a shop at rest,
/// but two items may transiently collide while a reorder is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: String,
    pub shop: Shop,
    pub item_name: String,
    pub order: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for adding an item to a shop's catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemInput {
    pub item_name: String,
}

/// Input for renaming an item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameItemInput {
    pub item_name: String,
}
