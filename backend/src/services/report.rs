//! Daily summary report rendering
//!
//! A [`ReportRenderer`] turns a [`DailySummary`] into a downloadable file.
//! Plain text and CSV renderers live here; a PDF renderer would plug in
//! behind the same trait.

use std::fmt::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::cash::BalanceStatus;
use shared::summary::{Breakdown, BreakdownLine, DailySummary};

use crate::config::ReportConfig;
use crate::error::{AppError, AppResult};

const NAME_WIDTH: usize = 18;

pub trait ReportRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;

    fn render(&self, summary: &DailySummary) -> AppResult<Vec<u8>>;

    fn file_name(&self, summary: &DailySummary) -> String {
        format!(
            "summary-{}-{}.{}",
            summary.shop.name(),
            summary.date.format("%Y-%m-%d"),
            self.file_extension()
        )
    }
}

/// Clip long item names so the breakdown columns stay aligned
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

// ============================================================================
// Plain text
// ============================================================================

pub struct TextReport {
    business_name: String,
    currency_label: String,
}

impl TextReport {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            business_name: config.business_name.clone(),
            currency_label: config.currency_label.clone(),
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{} {:.2}", self.currency_label, amount)
    }

    fn write_report(&self, s: &DailySummary, out: &mut String) -> std::fmt::Result {
        let title = format!("{} - Daily Summary Report", self.business_name);
        writeln!(out, "{}", title)?;
        writeln!(out, "{}", "=".repeat(title.len()))?;
        writeln!(out, "Shop: {}", s.shop)?;
        writeln!(out, "Date: {}", s.date.format("%Y-%m-%d"))?;
        let cashier = if s.cashier_name.is_empty() { "-" } else { s.cashier_name.as_str() };
        writeln!(out, "Cashier: {}", cashier)?;

        let stats = &s.stats;
        let eq = &s.equation;

        section(out, "FINANCIAL SUMMARY")?;
        line(out, "Opening Balance", self.money(s.opening_balance))?;
        line(out, "Bakery Sales Value", self.money(stats.bakery_sales_value))?;
        line(out, "Beverage Sales Value", self.money(stats.beverage_sales_value))?;
        line(out, "Total Sales Value", self.money(stats.grand_total_value))?;
        let closing = if s.closing_is_suggested {
            format!("{} (suggested)", self.money(s.closing_balance))
        } else {
            self.money(s.closing_balance)
        };
        line(out, "Closing Balance", closing)?;
        line(out, "Deposit", self.money(s.deposit))?;
        writeln!(out)?;
        writeln!(out, "Equation: Opening + Selling - Closing vs Deposit")?;
        writeln!(
            out,
            "{:.2} + {:.2} - {:.2} = {:.2}",
            eq.opening, eq.selling, eq.closing, eq.left
        )?;
        writeln!(out, "{:.2} vs {:.2}", eq.left, eq.right)?;
        match eq.status {
            BalanceStatus::Balanced => writeln!(out, "Balanced")?,
            BalanceStatus::Deficit => {
                writeln!(out, "Loss/Deficit: {}", self.money(eq.magnitude()))?
            }
            BalanceStatus::Surplus => {
                writeln!(out, "Surplus/Additional: {}", self.money(eq.magnitude()))?
            }
        }

        section(out, "INVENTORY SUMMARY")?;
        line(out, "Item Types", stats.item_types)?;
        line(out, "Previous Day Remaining", stats.total_previous_remaining)?;
        line(out, "Morning In", stats.total_morning_in)?;
        line(out, "Evening In", stats.total_evening_in)?;
        line(out, "Extra In", stats.total_extra_in)?;
        line(out, "Starting Inventory", stats.total_starting_inventory)?;
        line(out, "Transfer Out", stats.total_transfer_out)?;
        line(out, "Discard", stats.total_discard)?;
        line(out, "Remaining", stats.total_remaining)?;
        line(out, "Total Sold", stats.total_sold)?;
        line(out, "Sold Percentage", format!("{}%", stats.sold_percentage))?;
        line(out, "Bakery Sales Value", self.money(stats.bakery_sales_value))?;

        section(out, "BEVERAGE SUMMARY")?;
        line(out, "Beverage Types", stats.beverage_types)?;
        line(out, "Previous Count", stats.beverage_previous_total)?;
        line(out, "Today Count", stats.beverage_today_total)?;
        line(out, "Sold", stats.beverage_sold_total)?;
        line(out, "Sales Value", self.money(stats.beverage_sales_value))?;
        writeln!(out)?;
        writeln!(out, "Individual Beverage Details:")?;
        for b in &s.beverages {
            let value = match b.total_value {
                Some(v) => self.money(v),
                None => "no price".to_string(),
            };
            writeln!(
                out,
                "  {}: previous {}, today {}, sold {}, {}",
                b.beverage, b.previous_day_count, b.today_count, b.selling_quantity, value
            )?;
        }

        section(out, "GRAND TOTAL SUMMARY")?;
        line(out, "Total Items Sold", stats.grand_total_sold)?;
        line(out, "Total Sales Value", self.money(stats.grand_total_value))?;
        if !s.missing_prices.is_empty() {
            writeln!(out)?;
            writeln!(out, "Missing prices: {}", s.missing_prices.join(", "))?;
        }

        section(out, "SOLD ITEMS BREAKDOWN")?;
        self.write_sold(out, &s.sold_items)?;

        section(out, "REMAINING ITEMS BREAKDOWN")?;
        write_remaining(out, &s.remaining_items)?;

        Ok(())
    }

    fn write_sold(&self, out: &mut String, table: &Breakdown) -> std::fmt::Result {
        if table.is_empty() {
            return writeln!(out, "No items sold.");
        }
        writeln!(
            out,
            "{:<w$} {:>5} {:>5} {:>5} {:>5} {:>5} {:>9} {:>11}",
            "Item", "Prev", "Morn", "Even", "Extra", "Sold", "Price", "Sales",
            w = NAME_WIDTH
        )?;
        for row in table.rows.iter().chain(std::iter::once(&table.total)) {
            let price = match (row.price, row.item_name.as_str()) {
                (Some(p), _) => format!("{:.2}", p),
                (None, "TOTAL") => String::new(),
                (None, _) => "-".to_string(),
            };
            let sales = row
                .sales_value
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "{:<w$} {:>5} {:>5} {:>5} {:>5} {:>5} {:>9} {:>11}",
                truncate_name(&row.item_name, NAME_WIDTH),
                row.previous_day_remaining,
                row.morning_in,
                row.evening_in,
                row.extra_in,
                row.sold,
                price,
                sales,
                w = NAME_WIDTH
            )?;
        }
        Ok(())
    }
}

fn write_remaining(out: &mut String, table: &Breakdown) -> std::fmt::Result {
    if table.is_empty() {
        return writeln!(out, "No remaining stock.");
    }
    writeln!(
        out,
        "{:<w$} {:>5} {:>5} {:>5} {:>5} {:>8} {:>7} {:>6}",
        "Item", "Prev", "Morn", "Even", "Extra", "Transfer", "Discard", "Remain",
        w = NAME_WIDTH
    )?;
    for row in table.rows.iter().chain(std::iter::once(&table.total)) {
        writeln!(
            out,
            "{:<w$} {:>5} {:>5} {:>5} {:>5} {:>8} {:>7} {:>6}",
            truncate_name(&row.item_name, NAME_WIDTH),
            row.previous_day_remaining,
            row.morning_in,
            row.evening_in,
            row.extra_in,
            row.transfer_out,
            row.discard,
            row.remaining,
            w = NAME_WIDTH
        )?;
    }
    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) -> std::fmt::Result {
    writeln!(out, "{:<24}{}", format!("{}:", label), value)
}

impl ReportRenderer for TextReport {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, summary: &DailySummary) -> AppResult<Vec<u8>> {
        let mut out = String::new();
        self.write_report(summary, &mut out)
            .map_err(|e| AppError::Internal(format!("Report formatting error: {}", e)))?;
        Ok(out.into_bytes())
    }
}

// ============================================================================
// CSV
// ============================================================================

/// One breakdown line, tagged with the table it belongs to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvLine<'a> {
    section: &'static str,
    item_name: &'a str,
    previous_day_remaining: u64,
    morning_in: u64,
    evening_in: u64,
    extra_in: u64,
    transfer_out: u64,
    discard: u64,
    remaining: u64,
    sold: u64,
    price: Option<Decimal>,
    sales_value: Option<Decimal>,
}

impl<'a> CsvLine<'a> {
    fn new(section: &'static str, line: &'a BreakdownLine) -> Self {
        Self {
            section,
            item_name: &line.item_name,
            previous_day_remaining: line.previous_day_remaining,
            morning_in: line.morning_in,
            evening_in: line.evening_in,
            extra_in: line.extra_in,
            transfer_out: line.transfer_out,
            discard: line.discard,
            remaining: line.remaining,
            sold: line.sold,
            price: line.price,
            sales_value: line.sales_value,
        }
    }
}

/// Both breakdown tables, totals included, as one CSV
pub struct CsvReport;

impl CsvReport {
    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

impl ReportRenderer for CsvReport {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, summary: &DailySummary) -> AppResult<Vec<u8>> {
        let tables = [("sold", &summary.sold_items), ("remaining", &summary.remaining_items)];
        let lines: Vec<CsvLine> = tables
            .iter()
            .flat_map(|&(section, table)| {
                table
                    .rows
                    .iter()
                    .chain(std::iter::once(&table.total))
                    .map(move |line| CsvLine::new(section, line))
            })
            .collect();
        Ok(Self::export_to_csv(&lines)?.into_bytes())
    }
}
