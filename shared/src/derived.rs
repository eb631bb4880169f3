//! Derived inventory engine
//!
//! Pure functions from a day's ledger entries, the catalog and the active
//! prices to the figures staff see on the inventory sheet. Nothing here is
//! stored; every row is re-derived whenever its inputs change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    is_beverage_name, Beverage, BeverageLedgerEntry, DailyLedgerEntry, MovementOverrides,
    Movements, Price, Shop, ShopItem,
};
use crate::session::PendingChanges;
use crate::types::{previous_day, LedgerKey};

// ============================================================================
// Core arithmetic
// ============================================================================

/// Previous day's remaining stock plus all same-day inflows
pub fn starting_inventory(previous_day_remaining: u32, m: &Movements) -> u64 {
    u64::from(previous_day_remaining)
        + u64::from(m.morning_in)
        + u64::from(m.evening_in)
        + u64::from(m.extra_in)
}

/// Units inferred as sold, floored at zero
pub fn selling_quantity(starting_inventory: u64, m: &Movements) -> u64 {
    let outflow =
        u64::from(m.remaining_inventory) + u64::from(m.transfer_out) + u64::from(m.discard);
    starting_inventory.saturating_sub(outflow)
}

/// Units sold from a beverage machine. A counter that went backwards
/// yields zero rather than a negative figure.
pub fn beverage_selling_quantity(previous_day_count: u32, today_count: u32) -> u64 {
    u64::from(today_count.saturating_sub(previous_day_count))
}

/// `None` when there is no price; zero is a real value
pub fn total_value(quantity: u64, price: Option<Decimal>) -> Option<Decimal> {
    price.map(|p| Decimal::from(quantity) * p)
}

// ============================================================================
// Row derivation
// ============================================================================

/// Everything needed to derive one bakery row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakeryInputs {
    pub item_name: String,
    #[serde(default)]
    pub previous_day_remaining: u32,
    #[serde(default)]
    pub stored: Option<Movements>,
    #[serde(default)]
    pub pending: Option<MovementOverrides>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakeryRow {
    pub item_name: String,
    pub previous_day_remaining: u32,
    #[serde(flatten)]
    pub movements: Movements,
    pub starting_inventory: u64,
    pub selling_quantity: u64,
    pub price: Option<Decimal>,
    pub total_value: Option<Decimal>,
    pub price_missing: bool,
    /// A ledger entry is stored for this key
    pub is_existing: bool,
    pub entry_id: Option<String>,
    /// The session holds unsaved edits for this key
    pub has_changes: bool,
}

impl BakeryRow {
    /// True if any movement or carried-over stock is non-zero
    pub fn has_activity(&self) -> bool {
        self.previous_day_remaining > 0 || self.movements.has_activity()
    }
}

pub fn derive_bakery_row(inputs: &BakeryInputs) -> BakeryRow {
    let stored = inputs.stored.unwrap_or_default();
    let movements = match &inputs.pending {
        Some(pending) => pending.apply(stored),
        None => stored,
    };
    let starting = starting_inventory(inputs.previous_day_remaining, &movements);
    let selling = selling_quantity(starting, &movements);

    BakeryRow {
        item_name: inputs.item_name.clone(),
        previous_day_remaining: inputs.previous_day_remaining,
        movements,
        starting_inventory: starting,
        selling_quantity: selling,
        price: inputs.price,
        total_value: total_value(selling, inputs.price),
        price_missing: inputs.price.is_none(),
        is_existing: inputs.stored.is_some(),
        entry_id: None,
        has_changes: inputs.pending.is_some(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageInputs {
    pub beverage: Beverage,
    #[serde(default)]
    pub previous_day_count: u32,
    #[serde(default)]
    pub stored_count: Option<u32>,
    #[serde(default)]
    pub pending_count: Option<u32>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageRow {
    pub beverage: Beverage,
    pub previous_day_count: u32,
    pub today_count: u32,
    pub selling_quantity: u64,
    pub price: Option<Decimal>,
    pub total_value: Option<Decimal>,
    pub price_missing: bool,
    pub is_existing: bool,
    pub entry_id: Option<String>,
    pub has_changes: bool,
}

pub fn derive_beverage_row(inputs: &BeverageInputs) -> BeverageRow {
    let today = inputs.pending_count.or(inputs.stored_count).unwrap_or(0);
    let selling = beverage_selling_quantity(inputs.previous_day_count, today);

    BeverageRow {
        beverage: inputs.beverage,
        previous_day_count: inputs.previous_day_count,
        today_count: today,
        selling_quantity: selling,
        price: inputs.price,
        total_value: total_value(selling, inputs.price),
        price_missing: inputs.price.is_none(),
        is_existing: inputs.stored_count.is_some(),
        entry_id: None,
        has_changes: inputs.pending_count.is_some(),
    }
}

// ============================================================================
// Snapshot and day sheet
// ============================================================================

/// Everything fetched from the store for one screen. Filtering happens here,
/// in memory, never at the store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub items: Vec<ShopItem>,
    pub prices: Vec<Price>,
    pub entries: Vec<DailyLedgerEntry>,
    pub beverages: Vec<BeverageLedgerEntry>,
}

impl Snapshot {
    /// Every catalog record for the shop, sorted by `order` (stable)
    pub fn catalog_entries(&self, shop: Shop) -> Vec<ShopItem> {
        let mut items: Vec<ShopItem> = self
            .items
            .iter()
            .filter(|item| item.shop == shop)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.order);
        items
    }

    /// The shop's bakery catalog: sorted, beverages excluded, first
    /// occurrence of each name kept
    pub fn catalog(&self, shop: Shop) -> Vec<ShopItem> {
        let mut seen = std::collections::HashSet::new();
        self.catalog_entries(shop)
            .into_iter()
            .filter(|item| !is_beverage_name(&item.item_name))
            .filter(|item| seen.insert(item.item_name.clone()))
            .collect()
    }

    pub fn price_record(&self, shop: Shop, item_name: &str) -> Option<&Price> {
        self.prices
            .iter()
            .find(|p| p.shop == shop && p.item_name == item_name)
    }

    pub fn price_for(&self, shop: Shop, item_name: &str) -> Option<Decimal> {
        self.price_record(shop, item_name).map(|p| p.price)
    }

    pub fn entry(&self, shop: Shop, date: NaiveDate, item_name: &str) -> Option<&DailyLedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.shop == shop && e.date == date && e.item_name == item_name)
    }

    pub fn beverage_entry(
        &self,
        shop: Shop,
        date: NaiveDate,
        beverage: Beverage,
    ) -> Option<&BeverageLedgerEntry> {
        self.beverages
            .iter()
            .find(|e| e.shop == shop && e.date == date && e.beverage == beverage)
    }
}

/// Derived rows for one shop and day, in catalog order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySheet {
    pub shop: Shop,
    pub date: NaiveDate,
    pub rows: Vec<BakeryRow>,
    pub beverages: Vec<BeverageRow>,
    /// Names of items with recorded activity but no price
    pub missing_prices: Vec<String>,
    pub bakery_sales_value: Decimal,
    pub beverage_sales_value: Decimal,
    pub total_sales_value: Decimal,
}

impl DaySheet {
    pub fn build(snapshot: &Snapshot, shop: Shop, date: NaiveDate, pending: &PendingChanges) -> Self {
        let yesterday = previous_day(date);

        let rows: Vec<BakeryRow> = snapshot
            .catalog(shop)
            .iter()
            .map(|item| {
                let name = item.item_name.as_str();
                let stored = snapshot.entry(shop, date, name);
                let inputs = BakeryInputs {
                    item_name: name.to_string(),
                    previous_day_remaining: snapshot
                        .entry(shop, yesterday, name)
                        .map(|e| e.movements.remaining_inventory)
                        .unwrap_or(0),
                    stored: stored.map(|e| e.movements),
                    pending: pending
                        .bakery_overrides(&LedgerKey::new(shop, date, name))
                        .copied(),
                    price: snapshot.price_for(shop, name),
                };
                let mut row = derive_bakery_row(&inputs);
                row.entry_id = stored.map(|e| e.id.clone());
                row
            })
            .collect();

        let beverages: Vec<BeverageRow> = Beverage::ALL
            .iter()
            .map(|beverage| {
                let stored = snapshot.beverage_entry(shop, date, *beverage);
                let inputs = BeverageInputs {
                    beverage: *beverage,
                    previous_day_count: snapshot
                        .beverage_entry(shop, yesterday, *beverage)
                        .map(|e| e.today_count)
                        .unwrap_or(0),
                    stored_count: stored.map(|e| e.today_count),
                    pending_count: pending
                        .beverage_override(&LedgerKey::new(shop, date, beverage.name())),
                    price: snapshot.price_for(shop, beverage.name()),
                };
                let mut row = derive_beverage_row(&inputs);
                row.entry_id = stored.map(|e| e.id.clone());
                row
            })
            .collect();

        let missing_prices = rows
            .iter()
            .filter(|r| r.price_missing && r.movements.has_activity())
            .map(|r| r.item_name.clone())
            .chain(
                beverages
                    .iter()
                    .filter(|b| b.price_missing && b.today_count > 0)
                    .map(|b| b.beverage.name().to_string()),
            )
            .collect();

        let bakery_sales_value: Decimal = rows.iter().filter_map(|r| r.total_value).sum();
        let beverage_sales_value: Decimal = beverages.iter().filter_map(|b| b.total_value).sum();

        Self {
            shop,
            date,
            rows,
            beverages,
            missing_prices,
            bakery_sales_value,
            beverage_sales_value,
            total_sales_value: bakery_sales_value + beverage_sales_value,
        }
    }

    pub fn row(&self, item_name: &str) -> Option<&BakeryRow> {
        self.rows.iter().find(|r| r.item_name == item_name)
    }

    pub fn beverage(&self, beverage: Beverage) -> Option<&BeverageRow> {
        self.beverages.iter().find(|b| b.beverage == beverage)
    }
}
