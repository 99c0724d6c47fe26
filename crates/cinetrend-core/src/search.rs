//! Search state - what the query controller publishes to the presentation layer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::MovieSummary;

/// The message shown for every catalog failure
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies! Please try again later.";

/// Where the query controller is in its fetch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPhase::Idle => "idle",
            SearchPhase::Loading => "loading",
            SearchPhase::Success => "success",
            SearchPhase::Failed => "failed",
        }
    }
}

/// Snapshot of the search pipeline
///
/// `results` is always replaced as a whole when a fetch completes. Once a
/// fetch has settled, `is_loading` and `error` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Text as typed, updated on every keystroke
    pub raw_input: String,

    /// Last value that survived the debounce window
    pub debounced_input: String,

    /// A fetch for `debounced_input` is in flight
    pub is_loading: bool,

    /// User-facing error from the last settled fetch
    pub error: Option<String>,

    /// Results of the last settled fetch
    pub results: Vec<MovieSummary>,

    /// Current state machine phase
    pub phase: SearchPhase,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the committed input selects the popular listing instead of a search
    pub fn is_discover_mode(&self) -> bool {
        is_blank(&self.debounced_input)
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Whether a query should fall back to discover mode
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Normalize a raw search term into its counter key
///
/// Trims, collapses whitespace runs to one space and lowercases.
pub fn normalize_term(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A normalized, non-empty search term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Normalize `raw`, rejecting terms that are empty afterwards
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_term(raw);
        if normalized.is_empty() {
            return Err(CoreError::EmptyTerm);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
