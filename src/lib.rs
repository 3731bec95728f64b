//! # Travels
//!
//! In-memory HTTP store for users, locations and visits.
//!
//! ## Features
//!
//! - **Sharded storage**: per-kind id spaces split across independently locked shards
//! - **Live aggregates**: visits-by-user and marks-by-location kept in step with every insert
//! - **Parallel loading**: a ZIP archive of JSON documents decoded by a bounded worker pool
//! - **Small HTTP surface**: point reads, creates, and two aggregate queries
//!
//! ## Modules
//!
//! - [`store`]: Sharded entity store and entity types
//! - [`index`]: Aggregation indexes and query filters
//! - [`loader`]: Startup archive loader
//! - [`api`]: HTTP API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use travels::api::{serve, AppState};
//! use travels::loader::{ArchiveLoader, LoaderConfig};
//! use travels::store::{EntityStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = travels::Config::default();
//!     let store = Arc::new(EntityStore::new(StoreConfig::default()));
//!
//!     // Load the archive while the server is already answering
//!     let loader = ArchiveLoader::new(Arc::clone(&store), LoaderConfig::new("/tmp/data/data.zip"));
//!     let _load = loader.spawn();
//!
//!     let api_config = config.api_config();
//!     serve(AppState::new(store, api_config.clone()), &api_config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod index;
pub mod loader;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    EntityKind, EntityStore, Gender, Location, StoreConfig, StoreError, StoreResult, StoreStats,
    User, Validate, ValidationError, Visit,
};

pub use index::{AverageFilter, VisitsFilter};

pub use loader::{ArchiveLoader, LoadSummary, LoaderConfig, LoaderError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
