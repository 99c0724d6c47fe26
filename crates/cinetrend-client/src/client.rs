//! HTTP catalog client

use async_trait::async_trait;
use cinetrend_core::{MoviePage, MovieSummary, SortOrder};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::CatalogConfig;
use crate::error::{ClientError, Result};
use crate::service::CatalogService;

const SEARCH_PATH: &str = "api/search/movie";
const DISCOVER_PATH: &str = "api/discover/movie";

/// Client for the catalog's REST endpoints
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Build a client from configuration
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        debug!("Catalog client targeting {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Build a client for a base URL with default settings
    pub fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::new(CatalogConfig::new(url)?)
    }

    /// Get the catalog base URL
    pub fn url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the search endpoint for `query`
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.endpoint(SEARCH_PATH)?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    /// URL of the discover endpoint for `sort_by`
    pub fn discover_url(&self, sort_by: SortOrder) -> Result<Url> {
        let mut url = self.endpoint(DISCOVER_PATH)?;
        url.query_pairs_mut().append_pair("sort_by", sort_by.as_str());
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn get_page(&self, url: Url) -> Result<Vec<MovieSummary>> {
        debug!("GET {}", url);

        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let page: MoviePage =
            serde_json::from_slice(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;

        debug!("{} returned {} results", url.path(), page.results.len());
        Ok(page.results)
    }
}

#[async_trait]
impl CatalogService for CatalogClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>> {
        let url = self.search_url(query)?;
        self.get_page(url).await
    }

    async fn discover(&self, sort_by: SortOrder) -> Result<Vec<MovieSummary>> {
        let url = self.discover_url(sort_by)?;
        self.get_page(url).await
    }
}
