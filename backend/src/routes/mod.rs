//! Route definitions for the bakery inventory API

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Fixed shop and beverage lists
        .route("/shops", get(handlers::list_shops))
        // Per-shop catalog
        .nest("/shops/:shop/items", item_routes())
        // Per-shop prices
        .nest("/shops/:shop/prices", price_routes())
        // Daily ledger and summary
        .nest("/shops/:shop/days/:date", day_routes())
}

/// Catalog routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:id",
            put(handlers::rename_item).delete(handlers::delete_item),
        )
        .route("/:id/move", post(handlers::move_item))
}

/// Price routes
fn price_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_prices).put(handlers::save_prices))
        .route("/:item_name", delete(handlers::delete_price))
}

/// Ledger and summary routes
fn day_routes() -> Router<AppState> {
    Router::new()
        .route("/sheet", post(handlers::day_sheet))
        .route("/save", post(handlers::save_day))
        .route("/summary", post(handlers::daily_summary))
}
