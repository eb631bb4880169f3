//! Daily ledger handlers

use axum::{
    extract::{Path, State},
    Json,
};
use shared::session::PendingEdits;

use super::{parse_day, parse_shop};
use crate::error::AppResult;
use crate::services::ledger::{LedgerService, SheetView};
use crate::services::SaveOutcome;
use crate::AppState;

/// Derived sheet for a shop and day, with the posted edits applied
pub async fn day_sheet(
    State(state): State<AppState>,
    Path((shop, date)): Path<(String, String)>,
    Json(edits): Json<PendingEdits>,
) -> AppResult<Json<SheetView>> {
    let shop = parse_shop(&shop)?;
    let date = parse_day(&date)?;
    let view = LedgerService::new(state.store.clone())
        .day_sheet(shop, date, &edits)
        .await?;
    Ok(Json(view))
}

pub async fn save_day(
    State(state): State<AppState>,
    Path((shop, date)): Path<(String, String)>,
    Json(edits): Json<PendingEdits>,
) -> AppResult<Json<SaveOutcome>> {
    let shop = parse_shop(&shop)?;
    let date = parse_day(&date)?;
    let outcome = LedgerService::new(state.store.clone())
        .save_day(shop, date, &edits)
        .await?;
    Ok(Json(outcome))
}
