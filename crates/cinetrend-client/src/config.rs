//! Catalog endpoint configuration

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Environment variable holding the catalog base URL
pub const BASE_URL_ENV: &str = "CINETREND_API_BASE_URL";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "CINETREND_API_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the catalog client
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL the `/api/...` paths are resolved against
    pub base_url: Url,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    /// Configuration for a given base URL with the default timeout
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url.as_ref())?,
            ..Self::default()
        })
    }

    /// Read configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV) {
            config.base_url = parse_base_url(&url)?;
        }

        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{}: {}", TIMEOUT_ENV, e)))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a base URL, making sure relative joins keep any path prefix
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url: Url = raw
        .trim()
        .parse()
        .map_err(|e| ClientError::Config(format!("Invalid URL '{}': {}", raw, e)))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!("URL cannot be a base: {}", raw)));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
