//! Travels Archive Loader
//!
//! Populates the store from a ZIP archive of JSON documents at startup.
//!
//! - **archive**: ZIP entry enumeration and per-entry streams
//! - **document**: streaming decoder for one document
//!
//! # Architecture
//!
//! ```text
//! data.zip ─┬─ users_1.json     → task ─┐
//!           ├─ locations_1.json → task ─┼─ insert_* → EntityStore
//!           └─ visits_1.json    → task ─┘       (already serving traffic)
//! ```
//!
//! One blocking task per entry, at most `max_workers` running at once. All
//! tasks are joined before the load is reported complete. The store is
//! written through the same insert API as the HTTP write path, so readers
//! see a growing but never torn dataset while the load runs.

pub mod archive;
pub mod document;

pub use archive::ArchiveEntry;
pub use document::load_document;

use crate::store::{EntityKind, EntityStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Errors that abort a load
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The archive file could not be opened
    #[error("Failed to open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable ZIP archive
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A document is malformed
    #[error("{entry}: {source}")]
    Parse {
        entry: String,
        #[source]
        source: serde_json::Error,
    },

    /// A loader task panicked or was cancelled
    #[error("Loader task failed: {0}")]
    Task(String),
}

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Path of the ZIP archive
    pub archive: PathBuf,
    /// Maximum number of entries decoded concurrently
    pub max_workers: usize,
}

impl LoaderConfig {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            max_workers: default_workers(),
        }
    }
}

/// Number of available CPUs, or 4 when unknown
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Live per-kind counters, shared by all loader tasks
#[derive(Debug, Default)]
pub struct LoadStats {
    users: AtomicU64,
    locations: AtomicU64,
    visits: AtomicU64,
    skipped: AtomicU64,
}

impl LoadStats {
    pub fn record(&self, kind: EntityKind) {
        let counter = match kind {
            EntityKind::User => &self.users,
            EntityKind::Location => &self.locations,
            EntityKind::Visit => &self.visits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LoadSummary {
        LoadSummary {
            users: self.users.load(Ordering::Relaxed),
            locations: self.locations.load(Ordering::Relaxed),
            visits: self.visits.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            entries: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Totals of a finished load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub users: u64,
    pub locations: u64,
    pub visits: u64,
    /// Elements rejected by the store (duplicate ids)
    pub skipped: u64,
    /// Archive entries processed
    pub entries: usize,
    pub elapsed: Duration,
}

/// Loads a ZIP archive into an `EntityStore`
pub struct ArchiveLoader {
    store: Arc<EntityStore>,
    config: LoaderConfig,
    stats: Arc<LoadStats>,
}

impl ArchiveLoader {
    pub fn new(store: Arc<EntityStore>, config: LoaderConfig) -> Self {
        Self {
            store,
            config,
            stats: Arc::new(LoadStats::default()),
        }
    }

    /// Counters of the load in progress
    pub fn stats(&self) -> Arc<LoadStats> {
        Arc::clone(&self.stats)
    }

    /// Run the load in the background
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<LoadSummary, LoaderError>> {
        tokio::spawn(async move { self.load().await })
    }

    /// Load every entry of the archive and wait for all of them
    ///
    /// Returns the first error any entry produced.
    pub async fn load(&self) -> Result<LoadSummary, LoaderError> {
        let started = Instant::now();
        let path = Arc::new(self.config.archive.clone());

        tracing::info!("Loading archive {:?}", path);

        let entries = {
            let path = Arc::clone(&path);
            tokio::task::spawn_blocking(move || archive::list_entries(&path))
                .await
                .map_err(|e| LoaderError::Task(e.to_string()))??
        };
        let entry_count = entries.len();

        let permits = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for entry in entries {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| LoaderError::Task(e.to_string()))?;

            // Stop spawning as soon as a finished entry has failed
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = flatten(joined) {
                    tasks.abort_all();
                    return Err(e);
                }
            }

            let path = Arc::clone(&path);
            let store = Arc::clone(&self.store);
            let stats = Arc::clone(&self.stats);

            tasks.spawn_blocking(move || {
                let _permit = permit;
                load_entry(&path, &entry, &store, &stats)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = flatten(joined) {
                tasks.abort_all();
                return Err(e);
            }
        }

        let summary = LoadSummary {
            entries: entry_count,
            elapsed: started.elapsed(),
            ..self.stats.snapshot()
        };

        tracing::info!("Load finished in {:?}", summary.elapsed);
        tracing::info!(
            entries = summary.entries,
            skipped = summary.skipped,
            "Loaded {} users, {} locations, {} visits",
            summary.users,
            summary.locations,
            summary.visits
        );

        Ok(summary)
    }
}

fn flatten(
    joined: Result<Result<(), LoaderError>, tokio::task::JoinError>,
) -> Result<(), LoaderError> {
    joined.map_err(|e| LoaderError::Task(e.to_string()))?
}

fn load_entry(
    path: &std::path::Path,
    entry: &ArchiveEntry,
    store: &EntityStore,
    stats: &LoadStats,
) -> Result<(), LoaderError> {
    tracing::debug!(entry = %entry.name, "Loading entry");
    archive::with_entry(path, entry, |reader| {
        load_document(reader, &entry.name, store, stats)
    })?;
    tracing::debug!(entry = %entry.name, "Loaded entry");
    Ok(())
}
