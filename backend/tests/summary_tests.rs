//! Daily summary tests
//!
//! Tests for the end-of-day summary including:
//! - Inventory, beverage and grand totals over the day sheet
//! - Sold percentage rounding
//! - Cash equation with entered and suggested closing balances
//! - Text and CSV report rendering

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use bakery_backend::config::ReportConfig;
use bakery_backend::error::AppError;
use bakery_backend::services::summary::{SummaryRequest, SummaryService};
use bakery_backend::services::{
    CatalogService, CsvReport, LedgerService, PriceService, ReportRenderer, TextReport,
};
use bakery_backend::store::{DocumentStore, MemoryDocumentStore};
use shared::cash::{BalanceStatus, CashFigures};
use shared::models::{CreateItemInput, PriceEdit, Shop};
use shared::session::{BakeryEdit, BeverageEdit, PendingEdits};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
}

fn edit(item: &str, morning: i64, discard: i64, remaining: i64) -> BakeryEdit {
    BakeryEdit {
        item_name: item.to_string(),
        morning_in: Some(morning),
        evening_in: None,
        extra_in: None,
        transfer_out: None,
        discard: Some(discard),
        remaining_inventory: Some(remaining),
    }
}

fn nescafe(count: i64) -> BeverageEdit {
    BeverageEdit {
        item_name: "Nescafe".to_string(),
        today_count: count,
    }
}

/// Depanama on 2024-02-10: Bun carries 10 from the day before
async fn depanama() -> Arc<dyn DocumentStore> {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let catalog = CatalogService::new(store.clone());
    for name in ["Bun", "Roll"] {
        catalog
            .add_item(
                Shop::Depanama,
                CreateItemInput {
                    item_name: name.to_string(),
                },
            )
            .await
            .unwrap();
    }
    PriceService::new(store.clone())
        .save_prices(
            Shop::Depanama,
            vec![
                PriceEdit {
                    item_name: "Bun".to_string(),
                    price: dec("25"),
                },
                PriceEdit {
                    item_name: "Roll".to_string(),
                    price: dec("40"),
                },
                PriceEdit {
                    item_name: "Nescafe".to_string(),
                    price: dec("50"),
                },
            ],
        )
        .await
        .unwrap();

    let ledger = LedgerService::new(store.clone());
    ledger
        .save_day(
            Shop::Depanama,
            day(9),
            &PendingEdits {
                bakery: vec![edit("Bun", 0, 0, 10)],
                beverages: vec![nescafe(100)],
            },
        )
        .await
        .unwrap();
    ledger
        .save_day(
            Shop::Depanama,
            day(10),
            &PendingEdits {
                bakery: vec![edit("Bun", 50, 0, 5), edit("Roll", 20, 2, 3)],
                beverages: vec![nescafe(130)],
            },
        )
        .await
        .unwrap();
    store
}

fn request(opening: &str, closing: Option<&str>, deposit: &str) -> SummaryRequest {
    SummaryRequest {
        cash: CashFigures {
            opening_balance: dec(opening),
            closing_balance: closing.map(dec),
            deposit: dec(deposit),
            cashier_name: "  Nimal ".to_string(),
        },
        pending: PendingEdits::default(),
    }
}

#[tokio::test]
async fn test_summary_totals() {
    let store = depanama().await;
    let view = SummaryService::new(store)
        .daily_summary(Shop::Depanama, day(10), &request("1000", None, "4000"))
        .await
        .unwrap();
    let s = &view.summary;

    assert_eq!(s.cashier_name, "Nimal");
    assert_eq!(s.stats.item_types, 2);
    assert_eq!(s.stats.beverage_types, 2);
    assert_eq!(s.stats.total_previous_remaining, 10);
    assert_eq!(s.stats.total_morning_in, 70);
    assert_eq!(s.stats.total_discard, 2);
    assert_eq!(s.stats.total_remaining, 8);
    assert_eq!(s.stats.total_starting_inventory, 80);
    assert_eq!(s.stats.total_sold, 70);
    assert_eq!(s.stats.bakery_sales_value, dec("1975"));
    assert_eq!(s.stats.beverage_sold_total, 30);
    assert_eq!(s.stats.beverage_sales_value, dec("1500"));
    assert_eq!(s.stats.grand_total_value, dec("3475"));
    assert_eq!(s.stats.sold_percentage, dec("87.5"));

    // Suggested closing keeps the equation balanced
    assert!(s.closing_is_suggested);
    assert_eq!(s.closing_balance, dec("475"));
    assert_eq!(s.equation.status, BalanceStatus::Balanced);

    assert_eq!(s.sold_items.rows.len(), 2);
    assert_eq!(s.sold_items.total.sold, 70);
    assert_eq!(s.remaining_items.total.remaining, 8);
    assert!(s.missing_prices.is_empty());
}

#[tokio::test]
async fn test_summary_deficit_and_surplus() {
    let store = depanama().await;
    let service = SummaryService::new(store);

    let deficit = service
        .daily_summary(Shop::Depanama, day(10), &request("1000", Some("400"), "4000"))
        .await
        .unwrap();
    assert_eq!(deficit.summary.equation.status, BalanceStatus::Deficit);
    assert_eq!(deficit.summary.equation.magnitude(), dec("75"));

    let surplus = service
        .daily_summary(Shop::Depanama, day(10), &request("1000", Some("500"), "4000"))
        .await
        .unwrap();
    assert_eq!(surplus.summary.equation.status, BalanceStatus::Surplus);
    assert_eq!(surplus.summary.equation.magnitude(), dec("25"));
}

#[tokio::test]
async fn test_summary_includes_pending_edits() {
    let store = depanama().await;
    let mut req = request("0", None, "0");
    req.pending = PendingEdits {
        bakery: vec![edit("Roll", 30, 2, 3)],
        beverages: vec![],
    };
    let view = SummaryService::new(store)
        .daily_summary(Shop::Depanama, day(10), &req)
        .await
        .unwrap();
    assert_eq!(view.summary.stats.total_morning_in, 80);
    assert_eq!(view.summary.stats.total_sold, 80);
}

#[tokio::test]
async fn test_negative_cash_rejected() {
    let store = depanama().await;
    let err = SummaryService::new(store)
        .daily_summary(Shop::Depanama, day(10), &request("-1", None, "0"))
        .await
        .unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "openingBalance"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_text_report_sections() {
    let store = depanama().await;
    let view = SummaryService::new(store)
        .daily_summary(Shop::Depanama, day(10), &request("1000", Some("400"), "4000"))
        .await
        .unwrap();

    let renderer = TextReport::new(&ReportConfig::default());
    let text = String::from_utf8(renderer.render(&view.summary).unwrap()).unwrap();

    assert!(text.starts_with("T & S Bakery - Daily Summary Report"));
    assert!(text.contains("Shop: Depanama"));
    assert!(text.contains("Date: 2024-02-10"));
    assert!(text.contains("Cashier: Nimal"));
    for section in [
        "FINANCIAL SUMMARY",
        "INVENTORY SUMMARY",
        "BEVERAGE SUMMARY",
        "Individual Beverage Details:",
        "GRAND TOTAL SUMMARY",
        "SOLD ITEMS BREAKDOWN",
        "REMAINING ITEMS BREAKDOWN",
    ] {
        assert!(text.contains(section), "missing {}", section);
    }
    assert!(text.contains("Equation: Opening + Selling - Closing vs Deposit"));
    assert!(text.contains("Loss/Deficit: Rs. 75.00"));
    assert!(text.contains("87.5%"));
    assert!(text.contains("Rs. 3475.00"));
    assert!(text.contains("TOTAL"));
    assert_eq!(renderer.file_name(&view.summary), "summary-Depanama-2024-02-10.txt");
}

#[tokio::test]
async fn test_csv_report() {
    let store = depanama().await;
    let view = SummaryService::new(store)
        .daily_summary(Shop::Depanama, day(10), &request("0", None, "0"))
        .await
        .unwrap();

    let csv = String::from_utf8(CsvReport.render(&view.summary).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert!(lines[0].starts_with("section,itemName,previousDayRemaining"));
    // Header, two sold rows and a total, two remaining rows and a total
    assert_eq!(lines.len(), 7);
    assert!(lines[1].starts_with("sold,Bun,10,50,0,0,0,0,5,55,"));
    assert!(lines[3].starts_with("sold,TOTAL,"));
    assert!(lines[4].starts_with("remaining,Bun,"));
    assert_eq!(CsvReport.file_name(&view.summary), "summary-Depanama-2024-02-10.csv");
}
