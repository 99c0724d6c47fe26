//! Local file-based counter store

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinetrend_core::{top_entries, SearchTerm, TrendEntity, TrendEntry};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::counter::CounterStore;
use crate::error::{Result, StoreError};

/// On-disk contents of a counter store
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CounterFile {
    /// Schema version for forward compatibility
    version: u32,

    /// When the store was created
    created_at: DateTime<Utc>,

    /// When a counter last changed
    modified_at: DateTime<Utc>,

    /// Counters keyed by normalized term
    entries: BTreeMap<String, TrendEntry>,
}

impl CounterFile {
    const CURRENT_VERSION: u32 = 1;

    fn new() -> Self {
        let now = Utc::now();
        Self {
            version: Self::CURRENT_VERSION,
            created_at: now,
            modified_at: now,
            entries: BTreeMap::new(),
        }
    }
}

/// A counter store backed by the filesystem
///
/// Directory structure:
/// ```text
/// cinetrend-data/
/// ├── counters.json   # All counters, replaced on every increment
/// └── counters.lock   # Present while some process is incrementing
/// ```
///
/// Nothing is cached between calls. Reads load `counters.json`, which is only
/// ever replaced by rename, so they see other sessions' increments. Each
/// increment re-reads the file while holding `counters.lock`, so any number
/// of stores over the same directory, in one process or many, never lose a
/// count.
pub struct LocalCounterStore {
    /// Path to the store directory
    pub path: PathBuf,

    /// Queues this process's writers before they contend for the lockfile
    writer: Mutex<()>,
}

impl LocalCounterStore {
    const COUNTERS_FILE: &'static str = "counters.json";
    const TEMP_FILE: &'static str = "counters.json.tmp";
    const LOCK_FILE: &'static str = "counters.lock";

    /// Create a new store at the given path
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.join(Self::COUNTERS_FILE).exists() {
            return Err(StoreError::StoreExists(path.display().to_string()));
        }

        fs::create_dir_all(&path).await?;

        let _lock = FileLock::acquire(path.join(Self::LOCK_FILE)).await?;
        // Another process may have won the race to create it
        if path.join(Self::COUNTERS_FILE).exists() {
            return Err(StoreError::StoreExists(path.display().to_string()));
        }
        write_atomically(&path, &CounterFile::new()).await?;

        info!("Created counter store at {:?}", path);
        Ok(Self::at(path))
    }

    /// Open an existing store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let counters_path = path.join(Self::COUNTERS_FILE);
        if !counters_path.exists() {
            return Err(StoreError::InvalidPath(format!(
                "No counters found at {}",
                counters_path.display()
            )));
        }

        let file = load(&path).await?;

        info!("Opened counter store at {:?} ({} terms)", path, file.entries.len());
        Ok(Self::at(path))
    }

    /// Open the store at `path`, creating it if needed
    pub async fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.join(Self::COUNTERS_FILE).exists() {
            return Self::open(path).await;
        }

        match Self::create(path).await {
            Err(StoreError::StoreExists(_)) => Self::open(path).await,
            result => result,
        }
    }

    fn at(path: PathBuf) -> Self {
        Self {
            path,
            writer: Mutex::new(()),
        }
    }

    /// Number of distinct terms recorded
    pub async fn len(&self) -> Result<usize> {
        Ok(load(&self.path).await?.entries.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

#[async_trait]
impl CounterStore for LocalCounterStore {
    async fn increment(&self, term: &SearchTerm, entity: &TrendEntity) -> Result<TrendEntry> {
        let _writer = self.writer.lock().await;
        let _lock = FileLock::acquire(self.path.join(Self::LOCK_FILE)).await?;

        // Re-read under the lock so increments from other stores are kept
        let mut file = load(&self.path).await?;
        let entry = file
            .entries
            .entry(term.as_str().to_string())
            .and_modify(TrendEntry::bump)
            .or_insert_with(|| TrendEntry::first(term, entity))
            .clone();
        file.modified_at = entry.updated_at;

        write_atomically(&self.path, &file).await?;

        debug!("Counter for '{}' is now {}", term, entry.count);
        Ok(entry)
    }

    async fn top_k(&self, k: usize) -> Result<Vec<TrendEntry>> {
        let file = load(&self.path).await?;
        Ok(top_entries(file.entries.values(), k))
    }

    async fn get(&self, term: &SearchTerm) -> Result<Option<TrendEntry>> {
        let mut file = load(&self.path).await?;
        Ok(file.entries.remove(term.as_str()))
    }
}

async fn load(dir: &Path) -> Result<CounterFile> {
    let json = fs::read_to_string(dir.join(LocalCounterStore::COUNTERS_FILE)).await?;
    let file: CounterFile = serde_json::from_str(&json)?;

    if file.version > CounterFile::CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion(file.version));
    }
    Ok(file)
}

async fn write_atomically(dir: &Path, file: &CounterFile) -> Result<()> {
    let json = serde_json::to_string_pretty(file)?;
    let temp_path = dir.join(LocalCounterStore::TEMP_FILE);
    fs::write(&temp_path, json).await?;
    fs::rename(&temp_path, dir.join(LocalCounterStore::COUNTERS_FILE)).await?;
    Ok(())
}

/// Exclusive ownership of a lockfile, released on drop
///
/// Whoever creates the file with `create_new` owns it. A lockfile older than
/// `STALE_AFTER` was left by a process that died mid-write and is taken over.
#[derive(Debug)]
struct FileLock {
    path: PathBuf,
}

impl FileLock {
    const RETRY_DELAY: Duration = Duration::from_millis(10);
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
    const STALE_AFTER: Duration = Duration::from_secs(30);

    async fn acquire(path: PathBuf) -> Result<Self> {
        let started = Instant::now();

        loop {
            let created = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match created {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path).await {
                        warn!("Taking over stale lock {:?}", path);
                        remove_if_present(&path).await?;
                        continue;
                    }
                    if started.elapsed() >= Self::ACQUIRE_TIMEOUT {
                        return Err(StoreError::Unavailable(format!(
                            "timed out waiting for {}",
                            path.display()
                        )));
                    }
                    tokio::time::sleep(Self::RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}

async fn is_stale(path: &Path) -> bool {
    match fs::metadata(path).await.and_then(|meta| meta.modified()) {
        Ok(modified) => modified
            .elapsed()
            .map_or(false, |age| age > FileLock::STALE_AFTER),
        Err(_) => false,
    }
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
