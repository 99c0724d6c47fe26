//! The catalog service seam

use async_trait::async_trait;
use cinetrend_core::{is_blank, MovieSummary, SortOrder};

use crate::error::Result;

/// A movie catalog that can search by text and list titles by a sort order
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Full-text search
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>>;

    /// Unfiltered listing in the given order
    async fn discover(&self, sort_by: SortOrder) -> Result<Vec<MovieSummary>>;

    /// Search for `query`, or list popular titles when it is blank
    async fn fetch(&self, query: &str) -> Result<Vec<MovieSummary>> {
        if is_blank(query) {
            self.discover(SortOrder::PopularityDesc).await
        } else {
            self.search(query.trim()).await
        }
    }
}
