//! Movie types - catalog entries as returned by the catalog service

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base URL for poster images served by the catalog's image CDN
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A single movie as listed by the catalog
///
/// Only `id` is required. Everything the catalog sends beyond the fields
/// named here is kept in `extra` and serialized back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog identifier
    pub id: i64,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Relative poster path (e.g. "/abc123.jpg")
    #[serde(default)]
    pub poster_path: Option<String>,

    /// Remaining catalog-supplied fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MovieSummary {
    /// Create a movie with no extra catalog fields
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the poster path
    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    /// Full poster URL, if the catalog supplied a poster
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| {
                if path.starts_with('/') {
                    format!("{}{}", POSTER_BASE_URL, path)
                } else {
                    format!("{}/{}", POSTER_BASE_URL, path)
                }
            })
    }

    /// Look up a pass-through catalog field
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

/// A single page of catalog results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoviePage {
    pub results: Vec<MovieSummary>,
}

/// Sort orders accepted by the discover endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,

    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,

    #[serde(rename = "primary_release_date.desc")]
    ReleaseDateDesc,
}

impl SortOrder {
    /// Wire value for the `sort_by` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "popularity.desc",
            SortOrder::VoteAverageDesc => "vote_average.desc",
            SortOrder::ReleaseDateDesc => "primary_release_date.desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity.desc" => Ok(SortOrder::PopularityDesc),
            "vote_average.desc" => Ok(SortOrder::VoteAverageDesc),
            "primary_release_date.desc" => Ok(SortOrder::ReleaseDateDesc),
            other => Err(CoreError::InvalidSortOrder(other.to_string())),
        }
    }
}
