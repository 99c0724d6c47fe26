//! Session lifecycle - wires the controller to the aggregator and owns the timers
//!
//! Starting a session:
//! 1. Spawns the aggregator's event loop, fed by the controller's search events
//! 2. Spawns the trending poller (first tick is the initial leaderboard load)
//! 3. Kicks off the initial discover fetch for the empty input
//!
//! `shutdown` (or dropping the session) cancels the debounce timer and the
//! poller so nothing mutates state after teardown.

use std::sync::Arc;

use cinetrend_client::CatalogService;
use cinetrend_core::{SearchState, TrendingView};
use cinetrend_store::CounterStore;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

use crate::aggregator::TrendAggregator;
use crate::config::SessionConfig;
use crate::controller::QueryController;
use crate::error::{Result, SessionError};

/// A running search session
pub struct Session {
    controller: QueryController,
    aggregator: TrendAggregator,
    event_loop: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
}

impl Session {
    /// Start a session. Must be called from within a tokio runtime.
    pub fn start(
        config: SessionConfig,
        catalog: Arc<dyn CatalogService>,
        store: Arc<dyn CounterStore>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let controller = QueryController::new(catalog, events_tx, config.debounce);
        let aggregator = TrendAggregator::new(store, config.trending_limit);

        let event_loop = tokio::spawn(aggregator.clone().run(events_rx));
        let poller = tokio::spawn(aggregator.clone().poll(config.poll_interval));

        tokio::spawn({
            let controller = controller.clone();
            async move { controller.fetch_movies(String::new()).await }
        });

        info!(
            "Session started (debounce {:?}, poll every {:?}, top {})",
            config.debounce, config.poll_interval, config.trending_limit
        );

        Self {
            controller,
            aggregator,
            event_loop: Some(event_loop),
            poller: Some(poller),
        }
    }

    /// The single input entry point for the presentation layer
    pub fn on_input_change(&self, raw: impl Into<String>) {
        self.controller.on_input_change(raw);
    }

    /// Snapshot of the search pipeline
    pub fn search_state(&self) -> SearchState {
        self.controller.snapshot()
    }

    /// Snapshot of the leaderboard
    pub fn trending(&self) -> TrendingView {
        self.aggregator.view()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchState> {
        self.controller.subscribe()
    }

    pub fn subscribe_trending(&self) -> watch::Receiver<TrendingView> {
        self.aggregator.subscribe()
    }

    pub fn controller(&self) -> &QueryController {
        &self.controller
    }

    pub fn aggregator(&self) -> &TrendAggregator {
        &self.aggregator
    }

    /// Cancel the timers and stop processing search events
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop_tasks();

        if let Some(handle) = self.poller.take() {
            check_join("trending poller", handle.await)?;
        }
        if let Some(handle) = self.event_loop.take() {
            check_join("search event loop", handle.await)?;
        }

        info!("Session shut down");
        Ok(())
    }

    fn stop_tasks(&self) {
        self.controller.shutdown();
        for handle in [&self.poller, &self.event_loop].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}

fn check_join(task: &'static str, result: std::result::Result<(), JoinError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(SessionError::TaskPanicked {
            task,
            message: e.to_string(),
        }),
    }
}
