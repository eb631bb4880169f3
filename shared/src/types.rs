//! Common types used across the platform

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Shop;

/// Identifies one ledger row: a named item in a shop on a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerKey {
    pub shop: Shop,
    pub date: NaiveDate,
    pub item_name: String,
}

impl LedgerKey {
    pub fn new(shop: Shop, date: NaiveDate, item_name: impl Into<String>) -> Self {
        Self {
            shop,
            date,
            item_name: item_name.into(),
        }
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.shop, self.date, self.item_name)
    }
}

/// Notification category shown to staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// A user-facing notification produced by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Direction of a one-slot catalog move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// The calendar day before `date`. Dates are shop-local with no timezone
/// conversion.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}
