//! Trend types - per-term search counters and the ranked view over them

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MovieSummary, SearchTerm};

/// Default number of entries shown on the leaderboard
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

/// The movie a search term matched, as stored alongside its counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendEntity {
    /// Catalog id of the top result
    pub movie_id: i64,

    /// Resolved poster URL (empty when the movie has none)
    pub poster_url: String,
}

impl TrendEntity {
    pub fn new(movie_id: i64, poster_url: impl Into<String>) -> Self {
        Self {
            movie_id,
            poster_url: poster_url.into(),
        }
    }
}

impl From<&MovieSummary> for TrendEntity {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            movie_id: movie.id,
            poster_url: movie.poster_url().unwrap_or_default(),
        }
    }
}

/// Search counter for one normalized term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendEntry {
    /// Normalized search term
    pub key: String,

    /// Catalog id of the movie the term matched
    pub movie_id: i64,

    /// Poster of the matched movie
    pub poster_url: String,

    /// Number of successful searches recorded for this term
    pub count: u64,

    /// When the counter last changed
    pub updated_at: DateTime<Utc>,
}

impl TrendEntry {
    /// A fresh entry with `count = 1`
    pub fn first(term: &SearchTerm, entity: &TrendEntity) -> Self {
        Self {
            key: term.as_str().to_string(),
            movie_id: entity.movie_id,
            poster_url: entity.poster_url.clone(),
            count: 1,
            updated_at: Utc::now(),
        }
    }

    /// Count one more search. The movie matched on creation is kept.
    pub fn bump(&mut self) {
        self.count = self.count.saturating_add(1);
        self.updated_at = Utc::now();
    }
}

/// Leaderboard order: count descending, then key ascending
pub fn leaderboard_order(a: &TrendEntry, b: &TrendEntry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

/// Top `k` entries in leaderboard order
pub fn top_entries<'a>(entries: impl IntoIterator<Item = &'a TrendEntry>, k: usize) -> Vec<TrendEntry> {
    let mut ranked: Vec<TrendEntry> = entries.into_iter().cloned().collect();
    ranked.sort_by(leaderboard_order);
    ranked.truncate(k);
    ranked
}

/// Ranked snapshot of the most searched terms
///
/// Rebuilt from scratch on every refresh; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingView {
    entries: Vec<TrendEntry>,
}

impl TrendingView {
    /// Build a view from store output, keeping leaderboard order
    pub fn from_entries(mut entries: Vec<TrendEntry>) -> Self {
        entries.sort_by(leaderboard_order);
        Self { entries }
    }

    pub fn entries(&self) -> &[TrendEntry] {
        &self.entries
    }

    /// Entries paired with their 1-based rank
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &TrendEntry)> {
        self.entries.iter().enumerate().map(|(i, entry)| (i + 1, entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
