//! In-process fakes for the catalog and counter store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cinetrend_client::{CatalogService, ClientError};
use cinetrend_core::{MovieSummary, SearchTerm, SortOrder, TrendEntity, TrendEntry};
use cinetrend_store::{CounterStore, MemoryCounterStore, StoreError};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub fn movies(items: &[(i64, &str)]) -> Vec<MovieSummary> {
    items
        .iter()
        .map(|(id, title)| MovieSummary::new(*id, *title).with_poster(format!("/{}.jpg", id)))
        .collect()
}

/// Catalog with canned results per query
#[derive(Default)]
pub struct FakeCatalog {
    results: Mutex<HashMap<String, Vec<MovieSummary>>>,
    discover: Mutex<Vec<MovieSummary>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    fail: AtomicBool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&self, query: &str, results: Vec<MovieSummary>) {
        self.results.lock().insert(query.to_string(), results);
    }

    pub fn set_discover(&self, results: Vec<MovieSummary>) {
        *self.discover.lock() = results;
    }

    pub fn set_delay(&self, query: &str, delay: Duration) {
        self.delays.lock().insert(query.to_string(), delay);
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Hold every request until the returned `Notify` is signalled
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&notify));
        notify
    }

    /// Requests seen so far, as `search:<query>` or `discover:<order>`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn respond(&self, key: &str, results: Vec<MovieSummary>) -> Result<Vec<MovieSummary>, ClientError> {
        let delay = self.delays.lock().get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(results)
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ClientError> {
        self.calls.lock().push(format!("search:{}", query));
        let results = self.results.lock().get(query).cloned().unwrap_or_default();
        self.respond(query, results).await
    }

    async fn discover(&self, sort_by: SortOrder) -> Result<Vec<MovieSummary>, ClientError> {
        self.calls.lock().push(format!("discover:{}", sort_by));
        let results = self.discover.lock().clone();
        self.respond("", results).await
    }
}

/// Memory store that can be told to fail and counts its calls
#[derive(Default)]
pub struct FakeCounterStore {
    inner: MemoryCounterStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    increments: AtomicUsize,
    reads: AtomicUsize,
}

impl FakeCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn count(&self, raw: &str) -> u64 {
        let term = SearchTerm::parse(raw).unwrap();
        self.inner
            .get(&term)
            .await
            .unwrap()
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl CounterStore for FakeCounterStore {
    async fn increment(&self, term: &SearchTerm, entity: &TrendEntity) -> Result<TrendEntry, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.increments.fetch_add(1, Ordering::SeqCst);
        self.inner.increment(term, entity).await
    }

    async fn top_k(&self, k: usize) -> Result<Vec<TrendEntry>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read rejected".to_string()));
        }
        self.inner.top_k(k).await
    }

    async fn get(&self, term: &SearchTerm) -> Result<Option<TrendEntry>, StoreError> {
        self.inner.get(term).await
    }
}
