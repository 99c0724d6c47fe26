//! CineTrend Session - The search pipeline and trend aggregation
//!
//! This crate provides:
//! - `QueryController`: debounced input, catalog fetches, loading/error state
//! - `TrendAggregator`: search counters and the polled leaderboard
//! - `Session`: wires the two together and owns their timers

pub mod aggregator;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::*;
pub use config::*;
pub use controller::*;
pub use debounce::*;
pub use error::*;
pub use session::*;
