//! Moving catalog items one slot up or down
//!
//! The swap is three sequential writes (park, shift, settle) and is not a
//! transaction. Only one move may run per shop; a second request while the
//! shop is locked is dropped. The lock clears a fixed delay after the move
//! finishes, whether it succeeded, failed or changed nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use shared::derived::Snapshot;
use shared::models::{Shop, ShopItem};
use shared::reorder::{plan_move, ReorderStep};
use shared::types::MoveDirection;

use crate::error::{AppError, AppResult};
use crate::services::SnapshotService;
use crate::store::records::timestamp_value;
use crate::store::{Collection, DocumentStore};

/// Per-shop reentrancy flags. Process-local, so only safe with a single
/// writer process.
#[derive(Debug, Clone, Default)]
pub struct ReorderGuard {
    flags: Arc<[AtomicBool; 8]>,
}

impl ReorderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the shop's flag. False if a move is already in flight.
    pub fn try_acquire(&self, shop: Shop) -> bool {
        self.flags[shop.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self, shop: Shop) {
        self.flags[shop.index()].store(false, Ordering::Release);
    }

    pub fn is_held(&self, shop: Shop) -> bool {
        self.flags[shop.index()].load(Ordering::Acquire)
    }

    /// Clear the flag once `delay` has passed
    pub fn release_after(&self, shop: Shop, delay: Duration) {
        if delay.is_zero() {
            self.release(shop);
            return;
        }
        let guard = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            guard.release(shop);
            tracing::debug!("Reorder lock released for {}", shop);
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MoveOutcome {
    /// All three writes committed
    Moved {
        steps: Vec<ReorderStep>,
        catalog: Vec<ShopItem>,
    },
    /// First item moved up, last item moved down, or unknown item
    NoOp,
    /// Another move is in flight for this shop
    Busy,
}

pub struct ReorderService {
    store: Arc<dyn DocumentStore>,
    guard: ReorderGuard,
    settle_delay: Duration,
}

impl ReorderService {
    pub fn new(store: Arc<dyn DocumentStore>, guard: ReorderGuard, settle_delay: Duration) -> Self {
        Self {
            store,
            guard,
            settle_delay,
        }
    }

    pub async fn move_item(
        &self,
        shop: Shop,
        item_id: &str,
        direction: MoveDirection,
    ) -> AppResult<MoveOutcome> {
        if !self.guard.try_acquire(shop) {
            tracing::info!("Dropping move of {} in {}: another move is in flight", item_id, shop);
            return Ok(MoveOutcome::Busy);
        }

        let result = self.run(shop, item_id, direction).await;
        self.guard.release_after(shop, self.settle_delay);
        result
    }

    async fn run(&self, shop: Shop, item_id: &str, direction: MoveDirection) -> AppResult<MoveOutcome> {
        let snapshot = Snapshot {
            items: SnapshotService::new(self.store.clone()).load_items().await?,
            ..Default::default()
        };
        let mut catalog = snapshot.catalog(shop);

        let Some(plan) = plan_move(&catalog, item_id, direction) else {
            tracing::debug!("Move {:?} of {} in {} is a no-op", direction, item_id, shop);
            return Ok(MoveOutcome::NoOp);
        };

        let item_name = plan.steps[0].item_name.clone();
        let mut committed = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            tracing::debug!(
                "Reorder {:?}: {} ({}) -> order {}",
                step.phase,
                step.item_name,
                step.item_id,
                step.order
            );
            let write = self
                .store
                .update(
                    Collection::ShopItems,
                    &step.item_id,
                    json!({ "order": step.order, "updatedAt": timestamp_value(Utc::now()) }),
                )
                .await;

            if let Err(e) = write {
                tracing::error!(
                    "Reorder of {} in {} stopped after {} of 3 writes: {}",
                    item_name,
                    shop,
                    committed.len(),
                    e
                );
                return Err(AppError::ReorderFailed {
                    item_name,
                    committed,
                    message: e.to_string(),
                });
            }
            committed.push(step.clone());
        }

        plan.apply_to(&mut catalog);
        tracing::info!("Moved {} {:?} in {}", item_name, direction, shop);

        Ok(MoveOutcome::Moved {
            steps: committed,
            catalog,
        })
    }
}
