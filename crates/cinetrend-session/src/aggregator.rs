//! Trend aggregator - records successful searches and keeps the leaderboard fresh
//!
//! Store failures stay in here. They are logged and the last good
//! `TrendingView` is kept; nothing is reported back to the search pipeline.

use std::sync::Arc;
use std::time::Duration;

use cinetrend_core::{MovieSummary, SearchTerm, TrendEntity, TrendEntry, TrendingView};
use cinetrend_store::{CounterStore, Result as StoreResult};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::controller::SearchSucceeded;

/// Owner of the trending view
#[derive(Clone)]
pub struct TrendAggregator {
    inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
    store: Arc<dyn CounterStore>,
    view: watch::Sender<TrendingView>,
    limit: usize,
    /// Serializes refreshes so the last one started is the last one published
    refresh_lock: Mutex<()>,
}

impl TrendAggregator {
    pub fn new(store: Arc<dyn CounterStore>, limit: usize) -> Self {
        let (view, _) = watch::channel(TrendingView::default());
        Self {
            inner: Arc::new(AggregatorInner {
                store,
                view,
                limit,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Count one successful search of `term` that matched `movie`
    pub async fn record(&self, term: &str, movie: &MovieSummary) -> StoreResult<TrendEntry> {
        let term = SearchTerm::parse(term)?;
        let entity = TrendEntity::from(movie);
        let entry = self.inner.store.increment(&term, &entity).await?;
        debug!("Recorded search '{}' ({} total)", term, entry.count);
        Ok(entry)
    }

    /// Re-read the top entries and replace the view
    ///
    /// On failure the previous view is kept.
    pub async fn refresh(&self) {
        let _serialized = self.inner.refresh_lock.lock().await;

        match self.inner.store.top_k(self.inner.limit).await {
            Ok(entries) => {
                let view = TrendingView::from_entries(entries);
                debug!("Trending view refreshed with {} entries", view.len());
                self.inner.view.send_replace(view);
            }
            Err(e) => warn!("Failed to refresh trending view: {}", e),
        }
    }

    /// Record a search event, then refresh so the leaderboard shows it
    pub async fn handle(&self, event: SearchSucceeded) {
        if let Err(e) = self.record(&event.term, &event.top).await {
            warn!("Failed to record search '{}': {}", event.term, e);
        }
        self.refresh().await;
    }

    /// Consume search events until every sender is gone
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<SearchSucceeded>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        debug!("Search event channel closed");
    }

    /// Refresh now and then on every `interval`, forever
    pub async fn poll(self, interval: Duration) {
        info!("Polling trending view every {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }

    /// Current leaderboard
    pub fn view(&self) -> TrendingView {
        self.inner.view.borrow().clone()
    }

    /// Receiver notified whenever the view is replaced
    pub fn subscribe(&self) -> watch::Receiver<TrendingView> {
        self.inner.view.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{movies, FakeCounterStore};

    fn aggregator(store: &Arc<FakeCounterStore>) -> TrendAggregator {
        TrendAggregator::new(Arc::clone(store) as Arc<dyn CounterStore>, 5)
    }

    #[tokio::test]
    async fn test_record_normalizes_term() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        let batman = &movies(&[(268, "Batman")])[0];

        aggregator.record("Batman", batman).await.unwrap();
        aggregator.record("  batman ", batman).await.unwrap();
        let entry = aggregator.record("BATMAN", batman).await.unwrap();

        assert_eq!(entry.key, "batman");
        assert_eq!(entry.count, 3);
        assert_eq!(entry.poster_url, "https://image.tmdb.org/t/p/w500/268.jpg");
    }

    #[tokio::test]
    async fn test_record_rejects_blank_term() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        let movie = &movies(&[(1, "x")])[0];

        assert!(aggregator.record("   ", movie).await.is_err());
        assert_eq!(store.increments(), 0);
    }

    #[tokio::test]
    async fn test_refresh_replaces_view() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        let movie = &movies(&[(1, "x")])[0];

        for term in ["heat", "alien", "heat"] {
            aggregator.record(term, movie).await.unwrap();
        }
        assert!(aggregator.view().is_empty());

        aggregator.refresh().await;
        let view = aggregator.view();
        let ranked: Vec<_> = view.ranked().map(|(rank, e)| (rank, e.key.clone(), e.count)).collect();
        assert_eq!(
            ranked,
            vec![(1, "heat".to_string(), 2), (2, "alien".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_view() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        let movie = &movies(&[(1, "x")])[0];

        aggregator.record("heat", movie).await.unwrap();
        aggregator.refresh().await;
        let before = aggregator.view();
        assert_eq!(before.len(), 1);

        aggregator.record("alien", movie).await.unwrap();
        store.fail_reads(true);
        aggregator.refresh().await;

        assert_eq!(aggregator.view(), before);
    }

    #[tokio::test]
    async fn test_failed_record_still_refreshes() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        store.fail_writes(true);

        aggregator
            .handle(SearchSucceeded {
                term: "heat".to_string(),
                top: movies(&[(949, "Heat")]).remove(0),
            })
            .await;

        assert_eq!(store.reads(), 1);
        assert!(aggregator.view().is_empty());
    }

    #[tokio::test]
    async fn test_view_limit() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = TrendAggregator::new(Arc::clone(&store) as Arc<dyn CounterStore>, 2);
        let movie = &movies(&[(1, "x")])[0];

        for term in ["a", "b", "c", "c", "b", "c"] {
            aggregator.record(term, movie).await.unwrap();
        }
        aggregator.refresh().await;

        let keys: Vec<_> = aggregator.view().entries().iter().map(|e| e.key.clone()).collect();
        assert_eq!(keys, vec!["c".to_string(), "b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_refreshes_on_interval() {
        let store = Arc::new(FakeCounterStore::new());
        let aggregator = aggregator(&store);
        let poller = tokio::spawn(aggregator.clone().poll(Duration::from_secs(30)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.reads(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.reads(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.reads(), 4);

        poller.abort();
    }
}
