//! HTTP handlers for the bakery inventory API

use chrono::NaiveDate;
use shared::models::Shop;
use shared::validation::parse_date;

use crate::error::{AppError, AppResult};

pub mod catalog;
pub mod health;
pub mod ledger;
pub mod prices;
pub mod shops;
pub mod summary;

pub use catalog::*;
pub use health::*;
pub use ledger::*;
pub use prices::*;
pub use shops::*;
pub use summary::*;

/// Resolve a shop path segment (its display name, already URL-decoded)
pub fn parse_shop(segment: &str) -> AppResult<Shop> {
    segment
        .parse()
        .map_err(|_| AppError::NotFound(format!("Shop {}", segment)))
}

pub fn parse_day(segment: &str) -> AppResult<NaiveDate> {
    Ok(parse_date(segment)?)
}
