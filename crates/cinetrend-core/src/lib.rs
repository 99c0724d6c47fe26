//! CineTrend Core - Core types for the movie discovery client
//!
//! This crate defines the data shared by every other CineTrend crate:
//! - `MovieSummary`: A catalog entry, passed through as the catalog sent it
//! - `SearchState`: What the query controller publishes to the presentation layer
//! - `TrendEntry` / `TrendingView`: Per-term search counters and their ranking
//! - `SearchTerm`: A normalized search term, used as the counter key

pub mod error;
pub mod movie;
pub mod search;
pub mod trend;

pub use error::*;
pub use movie::*;
pub use search::*;
pub use trend::*;
