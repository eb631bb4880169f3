//! Catalog service: the ordered list of bakery items configured per shop

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use shared::derived::Snapshot;
use shared::models::{CreateItemInput, Price, RenameItemInput, Shop, ShopItem};
use shared::validation::{ensure_unique_name, validate_item_name};

use crate::error::{AppError, AppResult};
use crate::services::SnapshotService;
use crate::store::records::{item_document, timestamp_value};
use crate::store::{Collection, DocumentStore};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn snapshot(&self) -> AppResult<Snapshot> {
        let loader = SnapshotService::new(self.store.clone());
        Ok(Snapshot {
            items: loader.load_items().await?,
            ..Default::default()
        })
    }

    /// The shop's catalog in sell order, beverages excluded
    pub async fn list(&self, shop: Shop) -> AppResult<Vec<ShopItem>> {
        Ok(self.snapshot().await?.catalog(shop))
    }

    /// Add an item at the end of the shop's catalog
    pub async fn add_item(&self, shop: Shop, input: CreateItemInput) -> AppResult<ShopItem> {
        let name = validate_item_name(&input.item_name)?;
        let entries = self.snapshot().await?.catalog_entries(shop);
        ensure_unique_name(&entries, &name, None)?;

        let order = entries
            .iter()
            .map(|i| i.order)
            .max()
            .unwrap_or(0)
            .max(0)
            .saturating_add(1);
        let now = Utc::now();
        let id = self
            .store
            .create(Collection::ShopItems, item_document(shop, &name, order, now))
            .await?;

        tracing::info!("Added item {} to {} at position {}", name, shop, order);

        Ok(ShopItem {
            id,
            shop,
            item_name: name,
            order,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// Rename an item and carry its price record over to the new name.
    ///
    /// Sequential writes, not atomic: the item, then any stale price already
    /// filed under the new name, then the item's own price. A stale price is
    /// only removed when the item brings a price of its own; otherwise it is
    /// adopted. If a price write fails the item keeps its new name and the
    /// failure lists what was written.
    pub async fn rename_item(
        &self,
        shop: Shop,
        item_id: &str,
        input: RenameItemInput,
    ) -> AppResult<ShopItem> {
        let name = validate_item_name(&input.item_name)?;
        let entries = self.snapshot().await?.catalog_entries(shop);
        let mut item = entries
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item {}", item_id)))?;
        ensure_unique_name(&entries, &name, Some(item_id))?;

        if item.item_name == name {
            return Ok(item);
        }

        let prices = SnapshotService::new(self.store.clone()).load_prices().await?;
        let (own, stale): (Vec<&Price>, Vec<&Price>) = prices
            .iter()
            .filter(|p| p.shop == shop && (p.item_name == item.item_name || p.item_name == name))
            .partition(|p| p.item_name == item.item_name);

        let old_name = std::mem::replace(&mut item.item_name, name.clone());
        let now = Utc::now();
        self.store
            .update(
                Collection::ShopItems,
                item_id,
                json!({ "itemName": name, "updatedAt": timestamp_value(now) }),
            )
            .await?;
        item.updated_at = Some(now);
        let mut committed = vec![format!("shopItems/{}", item_id)];

        if !own.is_empty() {
            for price in &stale {
                tracing::warn!("Replacing stale price {} filed under {} in {}", price.id, name, shop);
                if let Err(e) = self.store.delete(Collection::Prices, &price.id).await {
                    tracing::error!("Renamed item {} but could not clear price {}: {}", item_id, price.id, e);
                    return Err(AppError::PartialBatch {
                        committed,
                        failed: vec![format!("prices/{}", price.id)],
                    });
                }
                committed.push(format!("prices/{}", price.id));
            }
        }

        for price in &own {
            if let Err(e) = self
                .store
                .update(
                    Collection::Prices,
                    &price.id,
                    json!({ "itemName": name, "updatedAt": timestamp_value(now) }),
                )
                .await
            {
                tracing::error!("Renamed item {} but not its price {}: {}", item_id, price.id, e);
                return Err(AppError::PartialBatch {
                    committed,
                    failed: vec![format!("prices/{}", price.id)],
                });
            }
            committed.push(format!("prices/{}", price.id));
        }

        tracing::info!("Renamed item {} in {} from {} to {}", item_id, shop, old_name, name);
        Ok(item)
    }

    /// Delete an item and then its price. Ledger rows stay behind, orphaned.
    pub async fn delete_item(&self, shop: Shop, item_id: &str) -> AppResult<ShopItem> {
        let entries = self.snapshot().await?.catalog_entries(shop);
        let item = entries
            .into_iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("Item {}", item_id)))?;

        self.store.delete(Collection::ShopItems, item_id).await?;

        let prices = SnapshotService::new(self.store.clone()).load_prices().await?;
        for price in prices
            .iter()
            .filter(|p| p.shop == shop && p.item_name == item.item_name)
        {
            if let Err(e) = self.store.delete(Collection::Prices, &price.id).await {
                tracing::error!("Deleted item {} but not its price {}: {}", item_id, price.id, e);
                return Err(AppError::PartialBatch {
                    committed: vec![format!("shopItems/{}", item_id)],
                    failed: vec![format!("prices/{}", price.id)],
                });
            }
        }

        tracing::info!("Deleted item {} ({}) from {}", item.item_name, item_id, shop);
        Ok(item)
    }
}
