//! Cash figures, the end-of-day balance equation and the local cash book

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Shop;
use crate::types::previous_day;

/// Differences smaller than this are treated as balanced
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Cash figures typed in by the cashier. They are never stored in the
/// shared document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFigures {
    #[serde(default)]
    pub opening_balance: Decimal,
    /// `None` means use the suggested closing balance
    #[serde(default)]
    pub closing_balance: Option<Decimal>,
    #[serde(default)]
    pub deposit: Decimal,
    #[serde(default)]
    pub cashier_name: String,
}

impl CashFigures {
    pub fn closing_or_suggested(&self, total_sales: Decimal) -> Decimal {
        self.closing_balance
            .unwrap_or_else(|| suggested_closing(self.opening_balance, total_sales, self.deposit))
    }
}

/// Opening plus sales minus what was deposited
pub fn suggested_closing(opening: Decimal, total_sales: Decimal, deposit: Decimal) -> Decimal {
    opening + total_sales - deposit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Balanced,
    /// More cash expected than accounted for
    Deficit,
    Surplus,
}

/// `opening + selling - closing = deposit`, evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashEquation {
    pub opening: Decimal,
    pub selling: Decimal,
    pub closing: Decimal,
    pub deposit: Decimal,
    pub left: Decimal,
    pub right: Decimal,
    pub difference: Decimal,
    pub status: BalanceStatus,
}

impl CashEquation {
    pub fn compute(opening: Decimal, selling: Decimal, closing: Decimal, deposit: Decimal) -> Self {
        let left = opening + selling - closing;
        let right = deposit;
        let difference = left - right;
        let status = if difference.abs() < balance_tolerance() {
            BalanceStatus::Balanced
        } else if difference > Decimal::ZERO {
            BalanceStatus::Deficit
        } else {
            BalanceStatus::Surplus
        };

        Self {
            opening,
            selling,
            closing,
            deposit,
            left,
            right,
            difference,
            status,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.status == BalanceStatus::Balanced
    }

    /// Size of the shortfall or excess, always non-negative
    pub fn magnitude(&self) -> Decimal {
        self.difference.abs()
    }
}

/// Locally persisted summary-screen state for one browser.
///
/// The closing balance recorded for a shop on day D becomes the default
/// opening balance for that shop on D+1. Any field missing from stored
/// JSON falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CashBook {
    pub selected_shop: Option<Shop>,
    pub cashier_name: String,
    pub deposit: Decimal,
    pub opening_balance: Decimal,
    pub closing_balance: Option<Decimal>,
    closing_by_day: BTreeMap<String, Decimal>,
}

impl CashBook {
    fn day_key(shop: Shop, date: NaiveDate) -> String {
        format!("{}_{}", shop, date)
    }

    pub fn record_closing(&mut self, shop: Shop, date: NaiveDate, closing: Decimal) {
        self.closing_by_day.insert(Self::day_key(shop, date), closing);
    }

    pub fn closing_for(&self, shop: Shop, date: NaiveDate) -> Option<Decimal> {
        self.closing_by_day.get(&Self::day_key(shop, date)).copied()
    }

    /// Previous day's recorded closing, if any
    pub fn opening_for(&self, shop: Shop, date: NaiveDate) -> Option<Decimal> {
        self.closing_for(shop, previous_day(date))
    }

    /// Select a shop/day and load its default opening balance
    pub fn open_day(&mut self, shop: Shop, date: NaiveDate) {
        self.selected_shop = Some(shop);
        self.opening_balance = self.opening_for(shop, date).unwrap_or(Decimal::ZERO);
        self.closing_balance = None;
    }

    pub fn figures(&self) -> CashFigures {
        CashFigures {
            opening_balance: self.opening_balance,
            closing_balance: self.closing_balance,
            deposit: self.deposit,
            cashier_name: self.cashier_name.clone(),
        }
    }
}
