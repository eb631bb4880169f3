//! T & S Bakery inventory backend
//!
//! Catalog, price and daily ledger operations for eight bakery shops over a
//! flat JSON document store, plus the end-of-day summary and cash balance
//! report.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::ReorderGuard;
use store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
    /// Per-shop reorder flags, shared by every request
    pub reorder_guard: ReorderGuard,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            reorder_guard: ReorderGuard::new(),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "T & S Bakery Inventory API v1"
}
