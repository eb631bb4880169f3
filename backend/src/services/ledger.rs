//! Ledger service: the per-day inventory sheet and saving pending edits

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use shared::derived::DaySheet;
use shared::models::Shop;
use shared::session::{PendingChanges, PendingEdits};
use shared::types::Notice;

use crate::error::{AppError, AppResult};
use crate::services::{SaveOutcome, SnapshotService};
use crate::store::records::{beverage_document, inventory_document};
use crate::store::{Collection, DocumentStore};

/// A derived day sheet plus any warnings raised while loading it
#[derive(Debug, Clone, Serialize)]
pub struct SheetView {
    #[serde(flatten)]
    pub sheet: DaySheet,
    pub notices: Vec<Notice>,
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn DocumentStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Derive the sheet for one shop and day with the client's unsaved edits
    /// layered on top of stored entries
    pub async fn day_sheet(
        &self,
        shop: Shop,
        date: NaiveDate,
        edits: &PendingEdits,
    ) -> AppResult<SheetView> {
        let session = PendingChanges::from_edits(shop, date, edits)?;
        let loaded = SnapshotService::new(self.store.clone()).load().await?;
        let sheet = DaySheet::build(&loaded.snapshot, shop, date, &session);

        let mut notices = loaded.notices;
        if !sheet.missing_prices.is_empty() {
            notices.push(Notice::warning(format!(
                "Missing prices for: {}",
                sheet.missing_prices.join(", ")
            )));
        }

        Ok(SheetView { sheet, notices })
    }

    /// Write every savable edit, merged over the stored entry, with the
    /// derived columns alongside.
    ///
    /// All writes are issued together and joined. A failure fails the batch
    /// but does not undo the writes that went through.
    pub async fn save_day(
        &self,
        shop: Shop,
        date: NaiveDate,
        edits: &PendingEdits,
    ) -> AppResult<SaveOutcome> {
        let session = PendingChanges::from_edits(shop, date, edits)?;
        if session.savable_count() == 0 {
            return Ok(SaveOutcome::nothing("No changes detected to save"));
        }

        let snapshot = SnapshotService::new(self.store.clone()).load_strict().await?;
        let sheet = DaySheet::build(&snapshot, shop, date, &session);

        let mut bakery = Vec::new();
        for (key, _) in session.savable_bakery() {
            let row = sheet
                .row(&key.item_name)
                .ok_or_else(|| AppError::NotFound(format!("Item {} in {}", key.item_name, shop)))?;
            bakery.push((key, row));
        }
        let beverages: Vec<_> = session
            .savable_beverages()
            .filter_map(|(key, _)| {
                sheet
                    .beverages
                    .iter()
                    .find(|b| b.beverage.name() == key.item_name)
                    .map(|row| (key, row))
            })
            .collect();

        let now = Utc::now();
        let store = self.store.as_ref();

        let bakery_writes = bakery.into_iter().map(|(key, row)| async move {
            let result = match &row.entry_id {
                Some(id) => {
                    tracing::debug!("Updating ledger entry {} ({})", id, key);
                    store
                        .update(Collection::Inventory, id, inventory_document(key, row, now, false))
                        .await
                }
                None => {
                    tracing::debug!("Creating ledger entry for {}", key);
                    store
                        .create(Collection::Inventory, inventory_document(key, row, now, true))
                        .await
                        .map(|_| ())
                }
            };
            (key.to_string(), result)
        });

        let beverage_writes = beverages.into_iter().map(|(key, row)| async move {
            let result = match &row.entry_id {
                Some(id) => {
                    tracing::debug!("Updating beverage entry {} ({})", id, key);
                    store
                        .update(Collection::Beverages, id, beverage_document(key, row, now, false))
                        .await
                }
                None => {
                    tracing::debug!("Creating beverage entry for {}", key);
                    store
                        .create(Collection::Beverages, beverage_document(key, row, now, true))
                        .await
                        .map(|_| ())
                }
            };
            (key.to_string(), result)
        });

        let (mut results, beverage_results) =
            tokio::join!(join_all(bakery_writes), join_all(beverage_writes));
        results.extend(beverage_results);

        let outcome = SaveOutcome::collect(results)?;
        tracing::info!("Saved {} ledger entries for {} on {}", outcome.saved, shop, date);
        let message = format!("Successfully saved {} items!", outcome.saved);
        Ok(outcome.with_notice(Notice::success(message)))
    }
}
