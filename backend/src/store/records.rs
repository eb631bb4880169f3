//! Typed records at the store boundary
//!
//! Documents written by older clients are loosely shaped: numbers may arrive
//! as strings, counts may be missing, timestamps may be strings or epoch
//! millis. Decoding coerces what it can and skips what it cannot.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use shared::derived::{BakeryRow, BeverageRow};
use shared::models::{
    Beverage, BeverageLedgerEntry, DailyLedgerEntry, Movements, Price, Shop, ShopItem,
};
use shared::types::LedgerKey;

use super::{Collection, Document};

// ============================================================================
// Field readers
// ============================================================================

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Integer read the way a browser `parseInt(x) || 0` would
pub fn int_field(data: &Value, key: &str) -> i64 {
    match data.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Non-negative count; anything unreadable or negative reads as zero
pub fn count_field(data: &Value, key: &str) -> u32 {
    u32::try_from(int_field(data, key).max(0)).unwrap_or(u32::MAX)
}

pub fn decimal_field(data: &Value, key: &str) -> Option<Decimal> {
    match data.get(key)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// RFC 3339 string, epoch millis, or a `{seconds, nanoseconds}` object
pub fn timestamp_field(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    match data.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(obj) => {
            let seconds = obj.get("seconds").and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

fn shop_field(data: &Value) -> Option<Shop> {
    str_field(data, "shop").and_then(|s| Shop::from_name(s.trim()))
}

fn date_field(data: &Value) -> Option<NaiveDate> {
    str_field(data, "date").and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn name_field(data: &Value) -> Option<String> {
    str_field(data, "itemName")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Decoders
// ============================================================================

pub fn decode_item(doc: &Document) -> Option<ShopItem> {
    Some(ShopItem {
        id: doc.id.clone(),
        shop: shop_field(&doc.data)?,
        item_name: name_field(&doc.data)?,
        order: int_field(&doc.data, "order"),
        created_at: timestamp_field(&doc.data, "createdAt"),
        updated_at: timestamp_field(&doc.data, "updatedAt"),
    })
}

/// A record that exists always has a price; an unreadable one reads as zero
pub fn decode_price(doc: &Document) -> Option<Price> {
    Some(Price {
        id: doc.id.clone(),
        shop: shop_field(&doc.data)?,
        item_name: name_field(&doc.data)?,
        price: decimal_field(&doc.data, "price").unwrap_or(Decimal::ZERO),
        created_at: timestamp_field(&doc.data, "createdAt"),
        updated_at: timestamp_field(&doc.data, "updatedAt"),
    })
}

pub fn decode_entry(doc: &Document) -> Option<DailyLedgerEntry> {
    let data = &doc.data;
    Some(DailyLedgerEntry {
        id: doc.id.clone(),
        shop: shop_field(data)?,
        item_name: name_field(data)?,
        date: date_field(data)?,
        movements: Movements {
            morning_in: count_field(data, "morningTime"),
            evening_in: count_field(data, "eveningTime"),
            extra_in: count_field(data, "extraIn"),
            transfer_out: count_field(data, "transferOut"),
            discard: count_field(data, "discard"),
            remaining_inventory: count_field(data, "remainingInventory"),
        },
        created_at: timestamp_field(data, "createdAt"),
        updated_at: timestamp_field(data, "updatedAt"),
    })
}

pub fn decode_beverage_entry(doc: &Document) -> Option<BeverageLedgerEntry> {
    let data = &doc.data;
    Some(BeverageLedgerEntry {
        id: doc.id.clone(),
        shop: shop_field(data)?,
        beverage: str_field(data, "itemName").and_then(|s| Beverage::from_name(s.trim()))?,
        date: date_field(data)?,
        today_count: count_field(data, "todayCount"),
        created_at: timestamp_field(data, "createdAt"),
        updated_at: timestamp_field(data, "updatedAt"),
    })
}

/// Decode every document, skipping (and logging) the unreadable ones
pub fn decode_all<T>(
    collection: Collection,
    docs: &[Document],
    decode: impl Fn(&Document) -> Option<T>,
) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| {
            let record = decode(doc);
            if record.is_none() {
                tracing::warn!(
                    collection = collection.name(),
                    id = %doc.id,
                    "skipping document that cannot be decoded"
                );
            }
            record
        })
        .collect()
}

// ============================================================================
// Encoders
// ============================================================================

pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Money is stored as a JSON number, as the front end has always written it
pub fn decimal_value(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn optional_decimal(value: Option<Decimal>) -> Value {
    value.map(decimal_value).unwrap_or(Value::Null)
}

fn with_timestamps(mut body: Map<String, Value>, now: DateTime<Utc>, created: bool) -> Value {
    if created {
        body.insert("createdAt".to_string(), timestamp_value(now));
    }
    body.insert("updatedAt".to_string(), timestamp_value(now));
    Value::Object(body)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn item_document(shop: Shop, item_name: &str, order: i64, now: DateTime<Utc>) -> Value {
    let body = object(json!({
        "shop": shop.name(),
        "itemName": item_name,
        "order": order,
    }));
    with_timestamps(body, now, true)
}

pub fn price_document(
    shop: Shop,
    item_name: &str,
    price: Decimal,
    now: DateTime<Utc>,
    created: bool,
) -> Value {
    let body = object(json!({
        "shop": shop.name(),
        "itemName": item_name,
        "price": decimal_value(price),
    }));
    with_timestamps(body, now, created)
}

/// Full ledger document for a bakery row, derived fields included
pub fn inventory_document(
    key: &LedgerKey,
    row: &BakeryRow,
    now: DateTime<Utc>,
    created: bool,
) -> Value {
    let m = &row.movements;
    let body = object(json!({
        "date": key.date.format("%Y-%m-%d").to_string(),
        "shop": key.shop.name(),
        "itemName": key.item_name,
        "previousDayRemaining": row.previous_day_remaining,
        "morningTime": m.morning_in,
        "eveningTime": m.evening_in,
        "extraIn": m.extra_in,
        "startingInventory": row.starting_inventory,
        "selling": row.selling_quantity,
        "transferOut": m.transfer_out,
        "discard": m.discard,
        "remainingInventory": m.remaining_inventory,
    }));
    with_timestamps(body, now, created)
}

pub fn beverage_document(
    key: &LedgerKey,
    row: &BeverageRow,
    now: DateTime<Utc>,
    created: bool,
) -> Value {
    let body = object(json!({
        "date": key.date.format("%Y-%m-%d").to_string(),
        "shop": key.shop.name(),
        "itemName": row.beverage.name(),
        "previousDayCount": row.previous_day_count,
        "todayCount": row.today_count,
        "selling": row.selling_quantity,
        "price": optional_decimal(row.price),
        "totalValue": optional_decimal(row.total_value),
    }));
    with_timestamps(body, now, created)
}
