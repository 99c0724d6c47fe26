//! Query controller - turns keystrokes into catalog requests
//!
//! The controller owns the `SearchState` and is the only thing that mutates
//! it. Input is written through immediately, debounced, and every change of
//! the committed input starts one catalog request. Presentation code only
//! ever sees cloned snapshots.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use cinetrend_client::CatalogService;
use cinetrend_core::{is_blank, MovieSummary, SearchPhase, SearchState, FETCH_ERROR_MESSAGE};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::debounce::Debouncer;

/// Emitted when a query-driven fetch returns at least one result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSucceeded {
    /// The committed input the search was issued for
    pub term: String,

    /// First result of the search
    pub top: MovieSummary,
}

/// Owner of the search pipeline state
#[derive(Clone)]
pub struct QueryController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    catalog: Arc<dyn CatalogService>,
    state: watch::Sender<SearchState>,
    events: mpsc::UnboundedSender<SearchSucceeded>,
    debouncer: Debouncer,
    /// Sequence number of the most recently started fetch
    latest_fetch: AtomicU64,
    closed: AtomicBool,
}

impl QueryController {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        events: mpsc::UnboundedSender<SearchSucceeded>,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::new());
        Self {
            inner: Arc::new(ControllerInner {
                catalog,
                state,
                events,
                debouncer: Debouncer::new(debounce),
                latest_fetch: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Record a keystroke and restart the debounce window
    pub fn on_input_change(&self, raw: impl Into<String>) {
        if self.is_closed() {
            return;
        }

        let raw = raw.into();
        self.inner.state.send_modify(|state| state.raw_input = raw);

        let controller = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(move || commit_debounced(controller));
    }

    /// Commit the current raw input and fetch if it differs from the last commit
    pub fn commit(&self) {
        if self.is_closed() {
            return;
        }

        let mut changed = None;
        self.inner.state.send_if_modified(|state| {
            if state.raw_input == state.debounced_input {
                return false;
            }
            state.debounced_input = state.raw_input.clone();
            changed = Some(state.debounced_input.clone());
            true
        });

        match changed {
            Some(query) => {
                debug!("Committed input {:?}", query);
                let controller = self.clone();
                tokio::spawn(async move { controller.fetch_movies(query).await });
            }
            None => debug!("Committed input unchanged, no fetch"),
        }
    }

    /// Fetch results for `query`, or the popular listing if it is blank
    ///
    /// Only the most recently started fetch writes to the state; older ones
    /// settle silently when they finish.
    pub async fn fetch_movies(&self, query: String) {
        if self.is_closed() {
            return;
        }

        let seq = self.inner.latest_fetch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
            state.phase = SearchPhase::Loading;
        });

        let guard = LoadingGuard::new(&self.inner, seq);

        match self.inner.catalog.fetch(&query).await {
            Ok(results) => {
                let event = if is_blank(&query) {
                    None
                } else {
                    results.first().map(|top| SearchSucceeded {
                        term: query.clone(),
                        top: top.clone(),
                    })
                };

                debug!("Fetch #{} for {:?} returned {} results", seq, query, results.len());
                guard.settle(FetchOutcome::Success(results));

                if let Some(event) = event {
                    if self.inner.events.send(event).is_err() {
                        debug!("Trend aggregator gone, search not recorded");
                    }
                }
            }
            Err(e) => {
                warn!("Error fetching movies for {:?}: {}", query, e);
                guard.settle(FetchOutcome::Failed);
            }
        }
    }

    /// Current state
    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Stop accepting input and drop the pending debounce evaluation
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.debouncer.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

fn commit_debounced(controller: Weak<ControllerInner>) {
    if let Some(inner) = controller.upgrade() {
        QueryController { inner }.commit();
    }
}

enum FetchOutcome {
    Success(Vec<MovieSummary>),
    Failed,
}

/// Clears `is_loading` when a fetch ends, however it ends
///
/// Dropping the guard without settling it (panic, aborted task) returns the
/// state to `Idle` with the previous results kept.
struct LoadingGuard<'a> {
    inner: &'a ControllerInner,
    seq: u64,
    outcome: Option<FetchOutcome>,
}

impl<'a> LoadingGuard<'a> {
    fn new(inner: &'a ControllerInner, seq: u64) -> Self {
        Self {
            inner,
            seq,
            outcome: None,
        }
    }

    fn settle(mut self, outcome: FetchOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            debug!("Fetch #{} settled after shutdown, dropped", self.seq);
            return;
        }

        if self.inner.latest_fetch.load(Ordering::SeqCst) != self.seq {
            debug!("Fetch #{} superseded, result discarded", self.seq);
            return;
        }

        let outcome = self.outcome.take();
        self.inner.state.send_modify(|state| {
            match outcome {
                Some(FetchOutcome::Success(results)) => {
                    state.results = results;
                    state.error = None;
                    state.phase = SearchPhase::Success;
                }
                Some(FetchOutcome::Failed) => {
                    state.results = Vec::new();
                    state.error = Some(FETCH_ERROR_MESSAGE.to_string());
                    state.phase = SearchPhase::Failed;
                }
                None => state.phase = SearchPhase::Idle,
            }
            state.is_loading = false;
        });
    }
}
