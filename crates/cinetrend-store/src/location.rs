//! Store location - picks and opens a counter store implementation

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::counter::CounterStore;
use crate::error::Result;
use crate::local::LocalCounterStore;
use crate::memory::MemoryCounterStore;

/// Where counter data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process memory, discarded on exit
    Memory,

    /// Local filesystem directory
    Local {
        /// Path to the store directory
        path: PathBuf,
    },
}

impl StoreLocation {
    /// Keyword that selects the in-memory store
    pub const MEMORY: &'static str = "memory";

    /// Parse a location from a config value: `memory` or a directory path
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case(Self::MEMORY) {
            StoreLocation::Memory
        } else {
            StoreLocation::Local {
                path: PathBuf::from(value),
            }
        }
    }

    /// Open the store, creating it on first use
    pub async fn open(&self) -> Result<Arc<dyn CounterStore>> {
        match self {
            StoreLocation::Memory => Ok(Arc::new(MemoryCounterStore::new())),
            StoreLocation::Local { path } => {
                Ok(Arc::new(LocalCounterStore::open_or_create(path).await?))
            }
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::Memory => f.write_str(Self::MEMORY),
            StoreLocation::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinetrend_core::{SearchTerm, TrendEntity};
    use tempfile::tempdir;

    #[test]
    fn test_parse() {
        assert_eq!(StoreLocation::parse("memory"), StoreLocation::Memory);
        assert_eq!(StoreLocation::parse(" MEMORY "), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("./data"),
            StoreLocation::Local { path: PathBuf::from("./data") }
        );
    }

    #[tokio::test]
    async fn test_open_local_creates_store() {
        let dir = tempdir().unwrap();
        let location = StoreLocation::Local { path: dir.path().join("trend") };

        let store = location.open().await.unwrap();
        let term = SearchTerm::parse("alien").unwrap();
        store.increment(&term, &TrendEntity::new(348, "")).await.unwrap();

        assert!(dir.path().join("trend").join("counters.json").exists());
    }
}
