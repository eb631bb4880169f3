//! Per-screen session state for unsaved ledger edits

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Beverage, MovementField, MovementOverrides, Shop};
use crate::types::LedgerKey;
use crate::validation::{validate_counter, validate_movement, ValidationError};

/// Unsaved edits for the shop/day currently open on the inventory screen.
///
/// Edits are keyed by (shop, date, item name). Changing the shop or date
/// filter discards everything; nothing is kept across filters.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChanges {
    shop: Shop,
    date: NaiveDate,
    bakery: BTreeMap<LedgerKey, MovementOverrides>,
    beverages: BTreeMap<LedgerKey, u32>,
}

impl PendingChanges {
    pub fn new(shop: Shop, date: NaiveDate) -> Self {
        Self {
            shop,
            date,
            bakery: BTreeMap::new(),
            beverages: BTreeMap::new(),
        }
    }

    pub fn shop(&self) -> Shop {
        self.shop
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Switch the screen filter. Returns true if edits were discarded.
    pub fn set_filter(&mut self, shop: Shop, date: NaiveDate) -> bool {
        if shop == self.shop && date == self.date {
            return false;
        }
        let had_edits = !self.is_empty();
        self.shop = shop;
        self.date = date;
        self.clear();
        had_edits
    }

    fn key(&self, item_name: &str) -> LedgerKey {
        LedgerKey::new(self.shop, self.date, item_name)
    }

    /// Record one movement edit for a bakery item. Negative values are
    /// rejected and leave the session untouched.
    pub fn record_bakery_edit(
        &mut self,
        item_name: &str,
        field: MovementField,
        value: i64,
    ) -> Result<(), ValidationError> {
        let value = validate_movement(field, value)?;
        let key = self.key(item_name);
        self.bakery.entry(key).or_default().set(field, value);
        Ok(())
    }

    /// Record the counter reading for a beverage machine
    pub fn record_beverage_edit(
        &mut self,
        beverage: Beverage,
        value: i64,
    ) -> Result<(), ValidationError> {
        let value = validate_counter(value)?;
        let key = self.key(beverage.name());
        self.beverages.insert(key, value);
        Ok(())
    }

    pub fn bakery_overrides(&self, key: &LedgerKey) -> Option<&MovementOverrides> {
        self.bakery.get(key)
    }

    pub fn beverage_override(&self, key: &LedgerKey) -> Option<u32> {
        self.beverages.get(key).copied()
    }

    /// Bakery edits worth writing: at least one edited column is positive
    pub fn savable_bakery(&self) -> impl Iterator<Item = (&LedgerKey, &MovementOverrides)> {
        self.bakery
            .iter()
            .filter(|(_, overrides)| overrides.has_positive_value())
    }

    /// Beverage edits worth writing: a positive counter reading
    pub fn savable_beverages(&self) -> impl Iterator<Item = (&LedgerKey, u32)> {
        self.beverages
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key, *count))
    }

    pub fn savable_count(&self) -> usize {
        self.savable_bakery().count() + self.savable_beverages().count()
    }

    pub fn clear(&mut self) {
        self.bakery.clear();
        self.beverages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bakery.is_empty() && self.beverages.is_empty()
    }

    /// Rebuild a session from edits sent by a client
    pub fn from_edits(
        shop: Shop,
        date: NaiveDate,
        edits: &PendingEdits,
    ) -> Result<Self, ValidationError> {
        let mut session = Self::new(shop, date);
        for edit in &edits.bakery {
            for (field, value) in edit.values() {
                if let Some(value) = value {
                    session.record_bakery_edit(&edit.item_name, field, value)?;
                }
            }
        }
        for edit in &edits.beverages {
            let beverage = Beverage::from_name(&edit.item_name).ok_or_else(|| {
                ValidationError::new(
                    "itemName",
                    format!("Unknown beverage: {}", edit.item_name),
                )
            })?;
            session.record_beverage_edit(beverage, edit.today_count)?;
        }
        Ok(session)
    }

    /// Flatten the session back into its wire form
    pub fn to_edits(&self) -> PendingEdits {
        let bakery = self
            .bakery
            .iter()
            .map(|(key, overrides)| BakeryEdit {
                item_name: key.item_name.clone(),
                morning_in: overrides.morning_in.map(i64::from),
                evening_in: overrides.evening_in.map(i64::from),
                extra_in: overrides.extra_in.map(i64::from),
                transfer_out: overrides.transfer_out.map(i64::from),
                discard: overrides.discard.map(i64::from),
                remaining_inventory: overrides.remaining_inventory.map(i64::from),
            })
            .collect();
        let beverages = self
            .beverages
            .iter()
            .map(|(key, count)| BeverageEdit {
                item_name: key.item_name.clone(),
                today_count: i64::from(*count),
            })
            .collect();
        PendingEdits { bakery, beverages }
    }
}

/// Pending edits as sent over the wire. Values are signed so that negative
/// input reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingEdits {
    #[serde(default)]
    pub bakery: Vec<BakeryEdit>,
    #[serde(default)]
    pub beverages: Vec<BeverageEdit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakeryEdit {
    pub item_name: String,
    #[serde(rename = "morningTime", default, skip_serializing_if = "Option::is_none")]
    pub morning_in: Option<i64>,
    #[serde(rename = "eveningTime", default, skip_serializing_if = "Option::is_none")]
    pub evening_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_out: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_inventory: Option<i64>,
}

impl BakeryEdit {
    fn values(&self) -> [(MovementField, Option<i64>); 6] {
        [
            (MovementField::MorningIn, self.morning_in),
            (MovementField::EveningIn, self.evening_in),
            (MovementField::ExtraIn, self.extra_in),
            (MovementField::TransferOut, self.transfer_out),
            (MovementField::Discard, self.discard),
            (MovementField::RemainingInventory, self.remaining_inventory),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeverageEdit {
    pub item_name: String,
    pub today_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_record_and_read_back() {
        let mut session = PendingChanges::new(Shop::Koswatta, day(3));
        session
            .record_bakery_edit("Bun", MovementField::MorningIn, 20)
            .unwrap();
        let key = LedgerKey::new(Shop::Koswatta, day(3), "Bun");
        assert_eq!(session.bakery_overrides(&key).unwrap().morning_in, Some(20));
        assert_eq!(session.bakery_overrides(&key).unwrap().discard, None);
    }

    #[test]
    fn test_negative_edit_rejected_without_effect() {
        let mut session = PendingChanges::new(Shop::Koswatta, day(3));
        assert!(session
            .record_bakery_edit("Bun", MovementField::Discard, -2)
            .is_err());
        assert!(session.record_beverage_edit(Beverage::Nestea, -1).is_err());
        assert!(session.is_empty());
    }

    #[test]
    fn test_filter_change_clears_edits() {
        let mut session = PendingChanges::new(Shop::Koswatta, day(3));
        session
            .record_bakery_edit("Bun", MovementField::MorningIn, 5)
            .unwrap();
        assert!(!session.set_filter(Shop::Koswatta, day(3)));
        assert!(!session.is_empty());
        assert!(session.set_filter(Shop::Koswatta, day(4)));
        assert!(session.is_empty());
        assert_eq!(session.date(), day(4));
    }

    #[test]
    fn test_savable_requires_positive_value() {
        let mut session = PendingChanges::new(Shop::Arawwala, day(3));
        session
            .record_bakery_edit("Bun", MovementField::Discard, 0)
            .unwrap();
        session
            .record_bakery_edit("Tea Bun", MovementField::EveningIn, 3)
            .unwrap();
        session.record_beverage_edit(Beverage::Nescafe, 0).unwrap();
        session.record_beverage_edit(Beverage::Nestea, 41).unwrap();

        let bakery: Vec<_> = session.savable_bakery().map(|(k, _)| k.item_name.clone()).collect();
        assert_eq!(bakery, vec!["Tea Bun".to_string()]);
        let beverages: Vec<_> = session.savable_beverages().collect();
        assert_eq!(beverages.len(), 1);
        assert_eq!(beverages[0].1, 41);
        assert_eq!(session.savable_count(), 2);
    }

    #[test]
    fn test_from_edits_wire_format() {
        let edits: PendingEdits = serde_json::from_str(
            r#"{
                "bakery": [{"itemName": "Bun", "morningTime": 20, "remainingInventory": 4}],
                "beverages": [{"itemName": "Nescafe", "todayCount": 120}]
            }"#,
        )
        .unwrap();
        let session = PendingChanges::from_edits(Shop::Depanama, day(2), &edits).unwrap();
        let key = LedgerKey::new(Shop::Depanama, day(2), "Bun");
        let overrides = session.bakery_overrides(&key).unwrap();
        assert_eq!(overrides.morning_in, Some(20));
        assert_eq!(overrides.remaining_inventory, Some(4));
        assert_eq!(overrides.evening_in, None);

        let key = LedgerKey::new(Shop::Depanama, day(2), "Nescafe");
        assert_eq!(session.beverage_override(&key), Some(120));
        assert_eq!(session.to_edits(), edits);
    }

    #[test]
    fn test_from_edits_rejects_unknown_beverage() {
        let edits = PendingEdits {
            bakery: vec![],
            beverages: vec![BeverageEdit {
                item_name: "Milo".to_string(),
                today_count: 3,
            }],
        };
        assert!(PendingChanges::from_edits(Shop::Depanama, day(2), &edits).is_err());
    }
}
