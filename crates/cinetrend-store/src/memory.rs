//! In-memory counter store

use std::collections::HashMap;

use async_trait::async_trait;
use cinetrend_core::{top_entries, SearchTerm, TrendEntity, TrendEntry};
use tokio::sync::RwLock;
use tracing::debug;

use crate::counter::CounterStore;
use crate::error::Result;

/// Counter store held in process memory
///
/// Counts are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: RwLock<HashMap<String, TrendEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms recorded
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, term: &SearchTerm, entity: &TrendEntity) -> Result<TrendEntry> {
        let mut entries = self.entries.write().await;

        let entry = entries
            .entry(term.as_str().to_string())
            .and_modify(TrendEntry::bump)
            .or_insert_with(|| TrendEntry::first(term, entity));

        debug!("Counter for '{}' is now {}", term, entry.count);
        Ok(entry.clone())
    }

    async fn top_k(&self, k: usize) -> Result<Vec<TrendEntry>> {
        let entries = self.entries.read().await;
        Ok(top_entries(entries.values(), k))
    }

    async fn get(&self, term: &SearchTerm) -> Result<Option<TrendEntry>> {
        Ok(self.entries.read().await.get(term.as_str()).cloned())
    }
}
