//! Price service: one active price per (shop, item name)

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use shared::derived::Snapshot;
use shared::models::{is_beverage_name, Price, PriceEdit, Shop};
use shared::types::Notice;
use shared::validation::{validate_price, ValidationError};

use crate::error::{AppError, AppResult};
use crate::services::{SaveOutcome, SnapshotService};
use crate::store::records::price_document;
use crate::store::{Collection, DocumentStore};

#[derive(Clone)]
pub struct PriceService {
    store: Arc<dyn DocumentStore>,
}

impl PriceService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Price records for one shop, sorted by item name
    pub async fn list(&self, shop: Shop) -> AppResult<Vec<Price>> {
        let mut prices: Vec<Price> = SnapshotService::new(self.store.clone())
            .load_prices()
            .await?
            .into_iter()
            .filter(|p| p.shop == shop)
            .collect();
        prices.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(prices)
    }

    pub async fn price_for(&self, shop: Shop, item_name: &str) -> AppResult<Option<Decimal>> {
        Ok(self
            .list(shop)
            .await?
            .into_iter()
            .find(|p| p.item_name == item_name)
            .map(|p| p.price))
    }

    /// Save a batch of edited prices.
    ///
    /// Every edit is validated before anything is written. Edits are keyed by
    /// trimmed item name and a later edit replaces an earlier one. Zero prices
    /// are treated as "no edit" and dropped. Only the shop's catalog items and
    /// the beverages can be priced.
    pub async fn save_prices(&self, shop: Shop, edits: Vec<PriceEdit>) -> AppResult<SaveOutcome> {
        let mut merged: Vec<(String, Option<Decimal>)> = Vec::new();
        for edit in edits {
            let name = edit.item_name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let price = validate_price(edit.price)?;
            match merged.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = price,
                None => merged.push((name, price)),
            }
        }
        let accepted: Vec<(String, Decimal)> = merged
            .into_iter()
            .filter_map(|(name, price)| price.map(|p| (name, p)))
            .collect();

        if accepted.is_empty() {
            return Ok(SaveOutcome::nothing("No price changes to save."));
        }

        let items = SnapshotService::new(self.store.clone()).load_items().await?;
        let catalog = Snapshot {
            items,
            ..Default::default()
        }
        .catalog(shop);
        if let Some((unknown, _)) = accepted
            .iter()
            .find(|(name, _)| !is_beverage_name(name) && !catalog.iter().any(|i| &i.item_name == name))
        {
            return Err(ValidationError::new(
                "itemName",
                format!("\"{}\" is not an item in {}", unknown, shop),
            )
            .into());
        }

        let existing = self.list(shop).await?;
        let now = Utc::now();
        let store = self.store.as_ref();

        let writes = accepted.iter().map(|(name, price)| {
            let current = existing.iter().find(|p| &p.item_name == name);
            async move {
                let result = match current {
                    Some(record) => {
                        tracing::debug!("Updating price of {} in {} to {}", name, shop, price);
                        store
                            .update(
                                Collection::Prices,
                                &record.id,
                                price_document(shop, name, *price, now, false),
                            )
                            .await
                    }
                    None => {
                        tracing::debug!("Creating price for {} in {}: {}", name, shop, price);
                        store
                            .create(Collection::Prices, price_document(shop, name, *price, now, true))
                            .await
                            .map(|_| ())
                    }
                };
                (name.clone(), result)
            }
        });

        let outcome = SaveOutcome::collect(join_all(writes).await)?;
        tracing::info!("Saved {} prices for {}", outcome.saved, shop);
        let message = format!("All {} prices saved successfully!", outcome.saved);
        Ok(outcome.with_notice(Notice::success(message)))
    }

    pub async fn delete_price(&self, shop: Shop, item_name: &str) -> AppResult<Price> {
        let record = self
            .list(shop)
            .await?
            .into_iter()
            .find(|p| p.item_name == item_name)
            .ok_or_else(|| AppError::NotFound(format!("Price for {}", item_name)))?;

        self.store.delete(Collection::Prices, &record.id).await?;
        tracing::info!("Deleted price of {} in {}", item_name, shop);
        Ok(record)
    }
}
