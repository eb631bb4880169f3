//! Loads everything a screen needs from the document store

use std::sync::Arc;

use shared::derived::Snapshot;
use shared::models::{Price, ShopItem};
use shared::types::Notice;

use crate::error::AppResult;
use crate::store::records::{decode_all, decode_beverage_entry, decode_entry, decode_item, decode_price};
use crate::store::{fetch_newest_first, Collection, DocumentStore, StoreResult};

/// A snapshot plus the warnings raised while loading it
#[derive(Debug, Clone, Default)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub notices: Vec<Notice>,
}

#[derive(Clone)]
pub struct SnapshotService {
    store: Arc<dyn DocumentStore>,
}

impl SnapshotService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch all four collections concurrently.
    ///
    /// Ledger collections must load. A failed price or catalog fetch only
    /// degrades the screen: it is reported as a warning and treated as empty.
    pub async fn load(&self) -> AppResult<LoadedSnapshot> {
        let store = self.store.as_ref();
        let (items, prices, entries, beverages) = tokio::join!(
            store.fetch_all(Collection::ShopItems),
            store.fetch_all(Collection::Prices),
            fetch_newest_first(store, Collection::Inventory),
            fetch_newest_first(store, Collection::Beverages),
        );

        let entries = entries?;
        let beverages = beverages?;

        let mut notices = Vec::new();
        let items = degrade(items, Collection::ShopItems, &mut notices);
        let prices = degrade(prices, Collection::Prices, &mut notices);

        let snapshot = Snapshot {
            items: decode_all(Collection::ShopItems, &items, decode_item),
            prices: decode_all(Collection::Prices, &prices, decode_price),
            entries: decode_all(Collection::Inventory, &entries, decode_entry),
            beverages: decode_all(Collection::Beverages, &beverages, decode_beverage_entry),
        };

        tracing::debug!(
            "Loaded snapshot: {} items, {} prices, {} entries, {} beverage entries",
            snapshot.items.len(),
            snapshot.prices.len(),
            snapshot.entries.len(),
            snapshot.beverages.len()
        );

        Ok(LoadedSnapshot { snapshot, notices })
    }

    /// Like [`SnapshotService::load`] but every collection must load. Used
    /// before writes, where an empty catalog or price list would be wrong.
    pub async fn load_strict(&self) -> AppResult<Snapshot> {
        let store = self.store.as_ref();
        let (items, prices, entries, beverages) = tokio::join!(
            store.fetch_all(Collection::ShopItems),
            store.fetch_all(Collection::Prices),
            fetch_newest_first(store, Collection::Inventory),
            fetch_newest_first(store, Collection::Beverages),
        );

        Ok(Snapshot {
            items: decode_all(Collection::ShopItems, &items?, decode_item),
            prices: decode_all(Collection::Prices, &prices?, decode_price),
            entries: decode_all(Collection::Inventory, &entries?, decode_entry),
            beverages: decode_all(Collection::Beverages, &beverages?, decode_beverage_entry),
        })
    }

    /// Every catalog record across all shops
    pub async fn load_items(&self) -> AppResult<Vec<ShopItem>> {
        let docs = self.store.fetch_all(Collection::ShopItems).await?;
        Ok(decode_all(Collection::ShopItems, &docs, decode_item))
    }

    /// Every price record across all shops
    pub async fn load_prices(&self) -> AppResult<Vec<Price>> {
        let docs = self.store.fetch_all(Collection::Prices).await?;
        Ok(decode_all(Collection::Prices, &docs, decode_price))
    }
}

fn degrade<T: Default>(
    result: StoreResult<T>,
    collection: Collection,
    notices: &mut Vec<Notice>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not load {}: {}", collection, e);
            let message = match collection {
                Collection::Prices => "Could not load prices. Sales values are shown without prices.",
                _ => "Could not load the item list for this shop.",
            };
            notices.push(Notice::warning(message));
            T::default()
        }
    }
}
