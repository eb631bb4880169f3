//! Daily stock ledger models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Beverage, Shop};

/// Stock movements recorded for one item on one day. All counts are
/// non-negative; an absent ledger entry means every count is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movements {
    #[serde(rename = "morningTime")]
    pub morning_in: u32,
    #[serde(rename = "eveningTime")]
    pub evening_in: u32,
    #[serde(rename = "extraIn")]
    pub extra_in: u32,
    #[serde(rename = "transferOut")]
    pub transfer_out: u32,
    pub discard: u32,
    #[serde(rename = "remainingInventory")]
    pub remaining_inventory: u32,
}

impl Movements {
    /// True if any movement is non-zero
    pub fn has_activity(&self) -> bool {
        MovementField::ALL.iter().any(|f| self.get(*f) > 0)
    }

    pub fn get(&self, field: MovementField) -> u32 {
        match field {
            MovementField::MorningIn => self.morning_in,
            MovementField::EveningIn => self.evening_in,
            MovementField::ExtraIn => self.extra_in,
            MovementField::TransferOut => self.transfer_out,
            MovementField::Discard => self.discard,
            MovementField::RemainingInventory => self.remaining_inventory,
        }
    }

    pub fn set(&mut self, field: MovementField, value: u32) {
        match field {
            MovementField::MorningIn => self.morning_in = value,
            MovementField::EveningIn => self.evening_in = value,
            MovementField::ExtraIn => self.extra_in = value,
            MovementField::TransferOut => self.transfer_out = value,
            MovementField::Discard => self.discard = value,
            MovementField::RemainingInventory => self.remaining_inventory = value,
        }
    }
}

/// An editable movement column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementField {
    #[serde(rename = "morningTime")]
    MorningIn,
    #[serde(rename = "eveningTime")]
    EveningIn,
    #[serde(rename = "extraIn")]
    ExtraIn,
    #[serde(rename = "transferOut")]
    TransferOut,
    #[serde(rename = "discard")]
    Discard,
    #[serde(rename = "remainingInventory")]
    RemainingInventory,
}

impl MovementField {
    pub const ALL: [MovementField; 6] = [
        MovementField::MorningIn,
        MovementField::EveningIn,
        MovementField::ExtraIn,
        MovementField::TransferOut,
        MovementField::Discard,
        MovementField::RemainingInventory,
    ];

    /// Document key for this column
    pub fn key(&self) -> &'static str {
        match self {
            MovementField::MorningIn => "morningTime",
            MovementField::EveningIn => "eveningTime",
            MovementField::ExtraIn => "extraIn",
            MovementField::TransferOut => "transferOut",
            MovementField::Discard => "discard",
            MovementField::RemainingInventory => "remainingInventory",
        }
    }
}

/// Unsaved in-session values for some of an item's movement columns.
/// `None` means "not edited": the stored value (or zero) applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementOverrides {
    #[serde(rename = "morningTime", default, skip_serializing_if = "Option::is_none")]
    pub morning_in: Option<u32>,
    #[serde(rename = "eveningTime", default, skip_serializing_if = "Option::is_none")]
    pub evening_in: Option<u32>,
    #[serde(rename = "extraIn", default, skip_serializing_if = "Option::is_none")]
    pub extra_in: Option<u32>,
    #[serde(rename = "transferOut", default, skip_serializing_if = "Option::is_none")]
    pub transfer_out: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard: Option<u32>,
    #[serde(rename = "remainingInventory", default, skip_serializing_if = "Option::is_none")]
    pub remaining_inventory: Option<u32>,
}

impl MovementOverrides {
    pub fn get(&self, field: MovementField) -> Option<u32> {
        match field {
            MovementField::MorningIn => self.morning_in,
            MovementField::EveningIn => self.evening_in,
            MovementField::ExtraIn => self.extra_in,
            MovementField::TransferOut => self.transfer_out,
            MovementField::Discard => self.discard,
            MovementField::RemainingInventory => self.remaining_inventory,
        }
    }

    pub fn set(&mut self, field: MovementField, value: u32) {
        let slot = match field {
            MovementField::MorningIn => &mut self.morning_in,
            MovementField::EveningIn => &mut self.evening_in,
            MovementField::ExtraIn => &mut self.extra_in,
            MovementField::TransferOut => &mut self.transfer_out,
            MovementField::Discard => &mut self.discard,
            MovementField::RemainingInventory => &mut self.remaining_inventory,
        };
        *slot = Some(value);
    }

    /// Layer these overrides on top of stored movements
    pub fn apply(&self, stored: Movements) -> Movements {
        let mut merged = stored;
        for field in MovementField::ALL {
            if let Some(value) = self.get(field) {
                merged.set(field, value);
            }
        }
        merged
    }

    /// True if at least one edited column holds a positive value
    pub fn has_positive_value(&self) -> bool {
        MovementField::ALL
            .iter()
            .any(|f| self.get(*f).is_some_and(|v| v > 0))
    }
}

/// Stock movement record for one bakery item in one shop on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLedgerEntry {
    pub id: String,
    pub shop: Shop,
    pub item_name: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub movements: Movements,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Counter reading for one beverage machine in one shop on one day.
/// `today_count` is cumulative, not a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageLedgerEntry {
    pub id: String,
    pub shop: Shop,
    #[serde(rename = "itemName")]
    pub beverage: Beverage,
    pub date: NaiveDate,
    pub today_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
