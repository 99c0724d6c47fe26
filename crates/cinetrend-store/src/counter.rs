//! The counter store seam

use async_trait::async_trait;
use cinetrend_core::{SearchTerm, TrendEntity, TrendEntry};

use crate::error::Result;

/// Persistent per-term search counters
///
/// Implementations own atomicity: concurrent `increment` calls for the same
/// term must never lose an update.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter for `term`, creating it with `count = 1` and
    /// `entity` as its match if it does not exist yet
    async fn increment(&self, term: &SearchTerm, entity: &TrendEntity) -> Result<TrendEntry>;

    /// The `k` highest counters, count descending
    async fn top_k(&self, k: usize) -> Result<Vec<TrendEntry>>;

    /// The counter for a single term
    async fn get(&self, term: &SearchTerm) -> Result<Option<TrendEntry>>;
}
