//! Price handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::{Price, PriceEdit};
use shared::types::Notice;

use super::parse_shop;
use crate::error::AppResult;
use crate::services::prices::PriceService;
use crate::services::SaveOutcome;
use crate::AppState;

#[derive(Deserialize)]
pub struct SavePricesRequest {
    #[serde(default)]
    pub prices: Vec<PriceEdit>,
}

#[derive(Serialize)]
pub struct PriceDeleted {
    pub price: Price,
    pub notice: Notice,
}

pub async fn list_prices(
    State(state): State<AppState>,
    Path(shop): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let shop = parse_shop(&shop)?;
    let prices = PriceService::new(state.store.clone()).list(shop).await?;
    Ok(Json(serde_json::json!({ "prices": prices })))
}

/// Save a batch of edited prices
pub async fn save_prices(
    State(state): State<AppState>,
    Path(shop): Path<String>,
    Json(input): Json<SavePricesRequest>,
) -> AppResult<Json<SaveOutcome>> {
    let shop = parse_shop(&shop)?;
    let outcome = PriceService::new(state.store.clone())
        .save_prices(shop, input.prices)
        .await?;
    Ok(Json(outcome))
}

pub async fn delete_price(
    State(state): State<AppState>,
    Path((shop, item_name)): Path<(String, String)>,
) -> AppResult<Json<PriceDeleted>> {
    let shop = parse_shop(&shop)?;
    let price = PriceService::new(state.store.clone())
        .delete_price(shop, &item_name)
        .await?;
    let notice = Notice::success(format!("Price for \"{}\" deleted", price.item_name));
    Ok(Json(PriceDeleted { price, notice }))
}
