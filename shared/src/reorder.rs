//! Planning half of the catalog reorder protocol
//!
//! Moving an item one slot swaps its `order` key with its neighbour's in
//! three writes. The item is first parked on a temporary key above both so
//! the two never share a key while the writes are in flight.

use serde::{Deserialize, Serialize};

use crate::models::ShopItem;
use crate::types::MoveDirection;

/// Gap between the larger of the two keys and the parking key
pub const TEMP_ORDER_OFFSET: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPhase {
    /// Moved item parked on the temporary key
    Park,
    /// Neighbour takes the moved item's original key
    Shift,
    /// Moved item takes the neighbour's original key
    Settle,
}

/// One write of the protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderStep {
    pub phase: StepPhase,
    pub item_id: String,
    pub item_name: String,
    pub order: i64,
}

/// The intended end state of a one-slot move and the writes to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPlan {
    pub direction: MoveDirection,
    pub moved_id: String,
    pub neighbour_id: String,
    pub moved_original: i64,
    pub neighbour_original: i64,
    pub temp_order: i64,
    pub steps: [ReorderStep; 3],
}

/// Plan moving `item_id` one slot within `catalog`, which must already be
/// sorted by `order`. Returns `None` for a boundary move, an unknown item, or
/// keys too close to `i64::MAX` to park above; such a move issues no writes.
pub fn plan_move(catalog: &[ShopItem], item_id: &str, direction: MoveDirection) -> Option<ReorderPlan> {
    let idx = catalog.iter().position(|item| item.id == item_id)?;
    let neighbour_idx = match direction {
        MoveDirection::Up => idx.checked_sub(1)?,
        MoveDirection::Down => {
            if idx + 1 >= catalog.len() {
                return None;
            }
            idx + 1
        }
    };

    let moved = &catalog[idx];
    let neighbour = &catalog[neighbour_idx];
    let temp_order = moved.order.max(neighbour.order).checked_add(TEMP_ORDER_OFFSET)?;

    let step = |phase, item: &ShopItem, order| ReorderStep {
        phase,
        item_id: item.id.clone(),
        item_name: item.item_name.clone(),
        order,
    };

    Some(ReorderPlan {
        direction,
        moved_id: moved.id.clone(),
        neighbour_id: neighbour.id.clone(),
        moved_original: moved.order,
        neighbour_original: neighbour.order,
        temp_order,
        steps: [
            step(StepPhase::Park, moved, temp_order),
            step(StepPhase::Shift, neighbour, moved.order),
            step(StepPhase::Settle, moved, neighbour.order),
        ],
    })
}

impl ReorderPlan {
    /// Apply the first `count` steps to an in-memory catalog
    pub fn apply_steps(&self, catalog: &mut [ShopItem], count: usize) {
        for step in self.steps.iter().take(count) {
            if let Some(item) = catalog.iter_mut().find(|i| i.id == step.item_id) {
                item.order = step.order;
            }
        }
    }

    /// Apply every step and re-sort
    pub fn apply_to(&self, catalog: &mut [ShopItem]) {
        self.apply_steps(catalog, self.steps.len());
        catalog.sort_by_key(|item| item.order);
    }
}
