//! CLI configuration, read from the environment

use cinetrend_client::CatalogConfig;
use cinetrend_session::SessionConfig;
use cinetrend_store::StoreLocation;

/// Environment variable selecting the counter store
pub const STORE_ENV: &str = "CINETREND_STORE";

const DEFAULT_STORE_DIR: &str = "./cinetrend-data";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog: CatalogConfig,
    pub store: StoreLocation,
    pub session: SessionConfig,
}

impl CliConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            catalog: CatalogConfig::from_env()?,
            store: store_location(std::env::var(STORE_ENV).ok()),
            session: SessionConfig::default(),
        })
    }
}

fn store_location(value: Option<String>) -> StoreLocation {
    StoreLocation::parse(value.as_deref().unwrap_or(DEFAULT_STORE_DIR))
}
