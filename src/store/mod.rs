//! Travels Entity Store
//!
//! This module provides the concurrent in-memory storage:
//!
//! - **types**: Entity types (User, Location, Visit) and their validation
//! - **shard**: `u32`-keyed map split into independently locked shards
//! - **engine**: The store orchestrating primary maps and indexes
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Entity → shard write lock → duplicate check → map (+ indexes for visits)
//!
//! Read Path:
//!   id → shard read lock → Arc<Entity>
//! ```
//!
//! # Example
//!
//! ```rust
//! use travels::store::{EntityStore, StoreConfig, Location};
//!
//! let store = EntityStore::new(StoreConfig::default());
//! store.insert_location(Location {
//!     id: 1,
//!     place: "Old bridge".to_string(),
//!     country: "Czechia".to_string(),
//!     city: "Prague".to_string(),
//!     distance: 3,
//! }).unwrap();
//!
//! assert_eq!(store.get_location(1).unwrap().city, "Prague");
//! assert!(store.get_location(2).is_none());
//! ```

pub mod engine;
pub mod error;
pub mod shard;
pub mod types;

// Re-export commonly used types
pub use engine::{EntityStore, StoreConfig, StoreStats};
pub use error::{StoreError, StoreResult, ValidationError};
pub use shard::ShardedMap;
pub use types::{EntityKind, Gender, Location, User, Validate, Visit};
