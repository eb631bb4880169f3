//! T & S Bakery inventory server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use bakery_backend::{
    config::{Config, StoreBackend},
    create_app,
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    AppState,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bakery_server=debug,bakery_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting T & S Bakery inventory server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Postgres => {
            if config.database.url.is_empty() {
                anyhow::bail!("database.url must be set for the postgres store (BAKERY__DATABASE__URL)");
            }

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await
                .context("connecting to the document database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Migrations completed");

            Arc::new(PgDocumentStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host / server.port")?;

    // Build application
    let app = create_app(AppState::new(store, config));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
