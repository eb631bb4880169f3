//! End-of-day summary for one shop
//!
//! Aggregates the derived day sheet and combines it with the cashier's
//! figures. Only catalog rows count; ledger rows for deleted items are inert.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cash::{CashEquation, CashFigures};
use crate::derived::{BakeryRow, BeverageRow, DaySheet};
use crate::models::Shop;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_previous_remaining: u64,
    pub total_morning_in: u64,
    pub total_evening_in: u64,
    pub total_extra_in: u64,
    pub total_transfer_out: u64,
    pub total_discard: u64,
    pub total_remaining: u64,
    pub total_starting_inventory: u64,
    pub total_sold: u64,
    pub bakery_sales_value: Decimal,
    pub beverage_previous_total: u64,
    pub beverage_today_total: u64,
    pub beverage_sold_total: u64,
    pub beverage_sales_value: Decimal,
    pub grand_total_sold: u64,
    pub grand_total_value: Decimal,
    pub item_types: usize,
    pub beverage_types: usize,
    /// Share of starting inventory sold, one decimal place
    pub sold_percentage: Decimal,
}

impl SummaryStats {
    pub fn from_sheet(sheet: &DaySheet) -> Self {
        let mut stats = SummaryStats {
            item_types: sheet.rows.len(),
            beverage_types: sheet.beverages.len(),
            ..Default::default()
        };

        for row in &sheet.rows {
            let m = &row.movements;
            stats.total_previous_remaining += u64::from(row.previous_day_remaining);
            stats.total_morning_in += u64::from(m.morning_in);
            stats.total_evening_in += u64::from(m.evening_in);
            stats.total_extra_in += u64::from(m.extra_in);
            stats.total_transfer_out += u64::from(m.transfer_out);
            stats.total_discard += u64::from(m.discard);
            stats.total_remaining += u64::from(m.remaining_inventory);
            stats.total_starting_inventory += row.starting_inventory;
            stats.total_sold += row.selling_quantity;
            stats.bakery_sales_value += row.total_value.unwrap_or(Decimal::ZERO);
        }

        for beverage in &sheet.beverages {
            stats.beverage_previous_total += u64::from(beverage.previous_day_count);
            stats.beverage_today_total += u64::from(beverage.today_count);
            stats.beverage_sold_total += beverage.selling_quantity;
            stats.beverage_sales_value += beverage.total_value.unwrap_or(Decimal::ZERO);
        }

        stats.grand_total_sold = stats.total_sold + stats.beverage_sold_total;
        stats.grand_total_value = stats.bakery_sales_value + stats.beverage_sales_value;
        stats.sold_percentage = sold_percentage(stats.total_sold, stats.total_starting_inventory);
        stats
    }
}

pub fn sold_percentage(sold: u64, starting: u64) -> Decimal {
    if starting == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(sold) * Decimal::ONE_HUNDRED / Decimal::from(starting))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// One line of an item breakdown table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub item_name: String,
    pub previous_day_remaining: u64,
    pub morning_in: u64,
    pub evening_in: u64,
    pub extra_in: u64,
    pub transfer_out: u64,
    pub discard: u64,
    pub remaining: u64,
    pub sold: u64,
    pub price: Option<Decimal>,
    pub sales_value: Option<Decimal>,
}

impl From<&BakeryRow> for BreakdownLine {
    fn from(row: &BakeryRow) -> Self {
        let m = &row.movements;
        Self {
            item_name: row.item_name.clone(),
            previous_day_remaining: u64::from(row.previous_day_remaining),
            morning_in: u64::from(m.morning_in),
            evening_in: u64::from(m.evening_in),
            extra_in: u64::from(m.extra_in),
            transfer_out: u64::from(m.transfer_out),
            discard: u64::from(m.discard),
            remaining: u64::from(m.remaining_inventory),
            sold: row.selling_quantity,
            price: row.price,
            sales_value: row.total_value,
        }
    }
}

/// A filtered table of catalog rows plus its TOTAL line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub rows: Vec<BreakdownLine>,
    pub total: BreakdownLine,
}

impl Breakdown {
    fn collect<'a>(rows: impl Iterator<Item = &'a BakeryRow>) -> Self {
        let rows: Vec<BreakdownLine> = rows.map(BreakdownLine::from).collect();
        let mut total = BreakdownLine {
            item_name: "TOTAL".to_string(),
            sales_value: Some(Decimal::ZERO),
            ..Default::default()
        };
        let mut value = Decimal::ZERO;
        for line in &rows {
            total.previous_day_remaining += line.previous_day_remaining;
            total.morning_in += line.morning_in;
            total.evening_in += line.evening_in;
            total.extra_in += line.extra_in;
            total.transfer_out += line.transfer_out;
            total.discard += line.discard;
            total.remaining += line.remaining;
            total.sold += line.sold;
            value += line.sales_value.unwrap_or(Decimal::ZERO);
        }
        total.sales_value = Some(value);
        Self { rows, total }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything shown on the summary screen and in the exported report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub shop: Shop,
    pub date: NaiveDate,
    pub cashier_name: String,
    pub stats: SummaryStats,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    /// Closing balance was not entered and the suggested value is used
    pub closing_is_suggested: bool,
    pub deposit: Decimal,
    pub equation: CashEquation,
    pub beverages: Vec<BeverageRow>,
    pub sold_items: Breakdown,
    pub remaining_items: Breakdown,
    pub missing_prices: Vec<String>,
}

impl DailySummary {
    pub fn build(sheet: &DaySheet, cash: &CashFigures) -> Self {
        let stats = SummaryStats::from_sheet(sheet);
        let total_sales = stats.grand_total_value;
        let closing = cash.closing_or_suggested(total_sales);
        let equation = CashEquation::compute(cash.opening_balance, total_sales, closing, cash.deposit);

        Self {
            shop: sheet.shop,
            date: sheet.date,
            cashier_name: cash.cashier_name.trim().to_string(),
            opening_balance: cash.opening_balance,
            closing_balance: closing,
            closing_is_suggested: cash.closing_balance.is_none(),
            deposit: cash.deposit,
            equation,
            beverages: sheet.beverages.clone(),
            sold_items: Breakdown::collect(sheet.rows.iter().filter(|r| r.selling_quantity > 0)),
            remaining_items: Breakdown::collect(
                sheet
                    .rows
                    .iter()
                    .filter(|r| r.movements.remaining_inventory > 0),
            ),
            missing_prices: sheet.missing_prices.clone(),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::Snapshot;
    use crate::models::{Beverage, BeverageLedgerEntry, DailyLedgerEntry, Movements, Price, ShopItem};
    use crate::session::PendingChanges;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn snapshot() -> Snapshot {
        let shop = Shop::Depanama;
        let item = |name: &str, order: i64| ShopItem {
            id: name.to_string(),
            shop,
            item_name: name.to_string(),
            order,
            created_at: None,
            updated_at: None,
        };
        let price = |name: &str, value: i64| Price {
            id: format!("p-{}", name),
            shop,
            item_name: name.to_string(),
            price: Decimal::new(value, 0),
            created_at: None,
            updated_at: None,
        };
        let entry = |name: &str, date: NaiveDate, movements: Movements| DailyLedgerEntry {
            id: format!("e-{}-{}", name, date),
            shop,
            item_name: name.to_string(),
            date,
            movements,
            created_at: None,
            updated_at: None,
        };
        let counter = |beverage: Beverage, date: NaiveDate, count: u32| BeverageLedgerEntry {
            id: format!("b-{:?}-{}", beverage, date),
            shop,
            beverage,
            date,
            today_count: count,
            created_at: None,
            updated_at: None,
        };

        Snapshot {
            items: vec![item("Bun", 1), item("Roll", 2), item("Cake", 3)],
            prices: vec![price("Bun", 25), price("Roll", 60), price("Nescafe", 100)],
            entries: vec![
                entry(
                    "Bun",
                    day(1),
                    Movements {
                        remaining_inventory: 5,
                        ..Default::default()
                    },
                ),
                entry(
                    "Bun",
                    day(2),
                    Movements {
                        morning_in: 50,
                        remaining_inventory: 10,
                        ..Default::default()
                    },
                ),
                entry(
                    "Roll",
                    day(2),
                    Movements {
                        morning_in: 20,
                        evening_in: 10,
                        transfer_out: 2,
                        discard: 3,
                        ..Default::default()
                    },
                ),
                entry(
                    "Cake",
                    day(2),
                    Movements {
                        extra_in: 4,
                        remaining_inventory: 4,
                        ..Default::default()
                    },
                ),
                // item deleted from the catalog
                entry(
                    "Pastry",
                    day(2),
                    Movements {
                        morning_in: 99,
                        ..Default::default()
                    },
                ),
            ],
            beverages: vec![
                counter(Beverage::Nescafe, day(1), 100),
                counter(Beverage::Nescafe, day(2), 130),
            ],
        }
    }

    fn sheet() -> DaySheet {
        let pending = PendingChanges::new(Shop::Depanama, day(2));
        DaySheet::build(&snapshot(), Shop::Depanama, day(2), &pending)
    }

    #[test]
    fn test_stats_totals() {
        let stats = SummaryStats::from_sheet(&sheet());
        assert_eq!(stats.total_previous_remaining, 5);
        assert_eq!(stats.total_morning_in, 70);
        assert_eq!(stats.total_evening_in, 10);
        assert_eq!(stats.total_extra_in, 4);
        assert_eq!(stats.total_starting_inventory, 89);
        // Bun 55-10, Roll 30-5, Cake 4-4
        assert_eq!(stats.total_sold, 70);
        assert_eq!(stats.bakery_sales_value, Decimal::new(45 * 25 + 25 * 60, 0));
        assert_eq!(stats.beverage_sold_total, 30);
        assert_eq!(stats.beverage_sales_value, Decimal::new(3000, 0));
        assert_eq!(stats.grand_total_sold, 100);
        assert_eq!(stats.item_types, 3);
        assert_eq!(stats.beverage_types, 2);
        assert_eq!(stats.sold_percentage, Decimal::new(787, 1));
    }

    #[test]
    fn test_orphaned_rows_are_inert() {
        let stats = SummaryStats::from_sheet(&sheet());
        assert_eq!(stats.total_morning_in, 70);
        let summary = DailySummary::build(&sheet(), &CashFigures::default());
        assert!(summary
            .sold_items
            .rows
            .iter()
            .all(|line| line.item_name != "Pastry"));
    }

    #[test]
    fn test_sold_percentage_zero_when_no_stock() {
        assert_eq!(sold_percentage(0, 0), Decimal::ZERO);
        assert_eq!(sold_percentage(1, 3), Decimal::new(333, 1));
        assert_eq!(sold_percentage(2, 3), Decimal::new(667, 1));
    }

    #[test]
    fn test_breakdowns() {
        let summary = DailySummary::build(&sheet(), &CashFigures::default());

        let sold: Vec<_> = summary.sold_items.rows.iter().map(|l| l.item_name.as_str()).collect();
        assert_eq!(sold, vec!["Bun", "Roll"]);
        assert_eq!(summary.sold_items.total.item_name, "TOTAL");
        assert_eq!(summary.sold_items.total.sold, 70);
        assert_eq!(summary.sold_items.total.sales_value, Some(Decimal::new(2625, 0)));

        let remaining: Vec<_> = summary
            .remaining_items
            .rows
            .iter()
            .map(|l| l.item_name.as_str())
            .collect();
        assert_eq!(remaining, vec!["Bun", "Cake"]);
        assert_eq!(summary.remaining_items.total.remaining, 14);
    }

    #[test]
    fn test_summary_uses_suggested_closing() {
        let cash = CashFigures {
            opening_balance: Decimal::new(1000, 0),
            deposit: Decimal::new(5000, 0),
            cashier_name: " Nimal ".to_string(),
            closing_balance: None,
        };
        let summary = DailySummary::build(&sheet(), &cash);
        // 1000 + 5625 - 5000
        assert_eq!(summary.closing_balance, Decimal::new(1625, 0));
        assert!(summary.closing_is_suggested);
        assert!(summary.equation.is_balanced());
        assert_eq!(summary.cashier_name, "Nimal");
    }
}
