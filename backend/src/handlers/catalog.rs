//! Catalog handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::models::{CreateItemInput, RenameItemInput, ShopItem};
use shared::types::{MoveDirection, Notice};

use super::parse_shop;
use crate::error::AppResult;
use crate::services::{CatalogService, MoveOutcome, ReorderService};
use crate::AppState;

#[derive(Serialize)]
pub struct ItemResponse {
    pub item: ShopItem,
    pub notice: Notice,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

/// List a shop's catalog in sell order
pub async fn list_items(
    State(state): State<AppState>,
    Path(shop): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let shop = parse_shop(&shop)?;
    let items = CatalogService::new(state.store.clone()).list(shop).await?;
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn create_item(
    State(state): State<AppState>,
    Path(shop): Path<String>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<impl IntoResponse> {
    let shop = parse_shop(&shop)?;
    let item = CatalogService::new(state.store.clone())
        .add_item(shop, input)
        .await?;
    let notice = Notice::success(format!("Item \"{}\" added to {}", item.item_name, shop));
    Ok((StatusCode::CREATED, Json(ItemResponse { item, notice })))
}

pub async fn rename_item(
    State(state): State<AppState>,
    Path((shop, item_id)): Path<(String, String)>,
    Json(input): Json<RenameItemInput>,
) -> AppResult<Json<ItemResponse>> {
    let shop = parse_shop(&shop)?;
    let item = CatalogService::new(state.store.clone())
        .rename_item(shop, &item_id, input)
        .await?;
    let notice = Notice::success(format!("Item renamed to \"{}\"", item.item_name));
    Ok(Json(ItemResponse { item, notice }))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path((shop, item_id)): Path<(String, String)>,
) -> AppResult<Json<ItemResponse>> {
    let shop = parse_shop(&shop)?;
    let item = CatalogService::new(state.store.clone())
        .delete_item(shop, &item_id)
        .await?;
    let notice = Notice::success(format!("Item \"{}\" deleted from {}", item.item_name, shop));
    Ok(Json(ItemResponse { item, notice }))
}

/// Move an item one slot up or down
pub async fn move_item(
    State(state): State<AppState>,
    Path((shop, item_id)): Path<(String, String)>,
    Json(input): Json<MoveRequest>,
) -> AppResult<Json<MoveOutcome>> {
    let shop = parse_shop(&shop)?;
    let service = ReorderService::new(
        state.store.clone(),
        state.reorder_guard.clone(),
        state.config.reorder.settle_delay(),
    );
    let outcome = service.move_item(shop, &item_id, input.direction).await?;
    Ok(Json(outcome))
}
