//! Configuration management for the bakery inventory backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BAKERY__ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Which document store to run against
    pub store: StoreConfig,

    pub reorder: ReorderConfig,

    /// Labels printed on the daily summary report
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, required for the postgres backend
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local, lost on restart
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReorderConfig {
    /// How long a shop stays locked after a move before another is accepted
    pub settle_delay_ms: u64,
}

impl ReorderConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub business_name: String,
    pub currency_label: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BAKERY__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("store.backend", "postgres")?
            .set_default("reorder.settle_delay_ms", 1000)?
            .set_default("report.business_name", "T & S Bakery")?
            .set_default("report.currency_label", "Rs.")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BAKERY__ prefix)
            .add_source(
                Environment::with_prefix("BAKERY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            business_name: "T & S Bakery".to_string(),
            currency_label: "Rs.".to_string(),
        }
    }
}
