//! Session timing configuration

use std::time::Duration;

use cinetrend_core::DEFAULT_TRENDING_LIMIT;

/// Configuration for a search session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long input must stay unchanged before it is searched
    pub debounce: Duration,

    /// How often the trending view is re-read regardless of searches
    pub poll_interval: Duration,

    /// Number of entries kept in the trending view
    pub trending_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            poll_interval: Duration::from_secs(30),
            trending_limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

impl SessionConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_trending_limit(mut self, trending_limit: usize) -> Self {
        self.trending_limit = trending_limit;
        self
    }
}
