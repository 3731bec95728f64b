//! Travels Entity Store
//!
//! The store owns one sharded map per entity kind plus the two aggregation
//! indexes:
//! - Read path: id → shard → read lock → `Arc` clone
//! - Write path: id → shard → write lock → duplicate check → insert
//!
//! Visit inserts update the primary map and both indexes under one set of
//! locks, always taken in the order visit shard → user index shard →
//! location index shard. No other operation holds more than one shard lock
//! at a time.

use crate::index::{AverageFilter, LocationMarks, UserVisits, VisitsFilter};
use crate::store::error::{StoreError, StoreResult};
use crate::store::shard::ShardedMap;
use crate::store::types::{EntityKind, Location, User, Visit};
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Configuration for the entity store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of shards per entity kind and per index (default: 64)
    pub shards: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { shards: 64 }
    }
}

impl StoreConfig {
    pub fn new(shards: usize) -> Self {
        Self { shards }
    }
}

/// Entity counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub locations: usize,
    pub visits: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} users, {} locations, {} visits",
            self.users, self.locations, self.visits
        )
    }
}

/// Concurrent in-memory store of users, locations and visits
pub struct EntityStore {
    users: ShardedMap<Arc<User>>,
    locations: ShardedMap<Arc<Location>>,
    visits: ShardedMap<Arc<Visit>>,
    /// user id → visits of that user
    user_visits: ShardedMap<UserVisits>,
    /// location id → marks given to that location
    location_marks: ShardedMap<LocationMarks>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl EntityStore {
    /// Create an empty store
    pub fn new(config: StoreConfig) -> Self {
        Self {
            users: ShardedMap::new(config.shards),
            locations: ShardedMap::new(config.shards),
            visits: ShardedMap::new(config.shards),
            user_visits: ShardedMap::new(config.shards),
            location_marks: ShardedMap::new(config.shards),
        }
    }

    // ==================== Point Lookups ====================

    pub fn get_user(&self, id: u32) -> Option<Arc<User>> {
        self.users.get(id)
    }

    pub fn get_location(&self, id: u32) -> Option<Arc<Location>> {
        self.locations.get(id)
    }

    pub fn get_visit(&self, id: u32) -> Option<Arc<Visit>> {
        self.visits.get(id)
    }

    /// Check whether an entity of `kind` exists under `id`
    pub fn contains(&self, kind: EntityKind, id: u32) -> bool {
        match kind {
            EntityKind::User => self.users.contains(id),
            EntityKind::Location => self.locations.contains(id),
            EntityKind::Visit => self.visits.contains(id),
        }
    }

    // ==================== Inserts ====================

    /// Store a user; rejects an id that is already taken
    pub fn insert_user(&self, user: User) -> StoreResult<()> {
        insert_unique(&self.users, EntityKind::User, user.id, Arc::new(user))
    }

    /// Store a location; rejects an id that is already taken
    pub fn insert_location(&self, location: Location) -> StoreResult<()> {
        insert_unique(
            &self.locations,
            EntityKind::Location,
            location.id,
            Arc::new(location),
        )
    }

    /// Store a visit and record it in both indexes
    ///
    /// The referenced user and location need not exist yet: archive
    /// documents are loaded concurrently and may arrive in any order.
    pub fn insert_visit(&self, visit: Visit) -> StoreResult<()> {
        let visit = Arc::new(visit);

        let mut visits = self.visits.write_shard(visit.id);
        let slot = match visits.entry(visit.id) {
            Entry::Occupied(_) => {
                return Err(StoreError::Duplicate {
                    kind: EntityKind::Visit,
                    id: visit.id,
                })
            }
            Entry::Vacant(slot) => slot,
        };
        let mut user_visits = self.user_visits.write_shard(visit.user);
        let mut location_marks = self.location_marks.write_shard(visit.location);

        user_visits
            .entry(visit.user)
            .or_default()
            .push(Arc::clone(&visit));
        location_marks
            .entry(visit.location)
            .or_default()
            .push(visit.mark);
        slot.insert(visit);

        Ok(())
    }

    // ==================== Aggregate Queries ====================

    /// Visits of a user in commit order
    ///
    /// Returns `Some(vec![])` for a known user without visits and `None`
    /// only when neither the user nor any visit referencing it exists.
    /// The filter is accepted but not applied yet.
    pub fn visits_for_user(&self, id: u32, _filter: &VisitsFilter) -> Option<Vec<Arc<Visit>>> {
        if let Some(visits) = self.user_visits.read_with(id, UserVisits::to_vec) {
            return Some(visits);
        }
        self.users.contains(id).then(Vec::new)
    }

    /// Mean mark of a location, rounded to five decimals
    ///
    /// `None` when the location has no marks, whether or not it exists.
    /// The filter is accepted but not applied yet.
    pub fn average_mark_for_location(&self, id: u32, _filter: &AverageFilter) -> Option<f64> {
        self.location_marks
            .read_with(id, LocationMarks::average)
            .flatten()
    }

    // ==================== Stats ====================

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            users: self.users.len(),
            locations: self.locations.len(),
            visits: self.visits.len(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.users.shard_count()
    }
}

fn insert_unique<T>(
    map: &ShardedMap<Arc<T>>,
    kind: EntityKind,
    id: u32,
    entity: Arc<T>,
) -> StoreResult<()> {
    match map.write_shard(id).entry(id) {
        Entry::Occupied(_) => Err(StoreError::Duplicate { kind, id }),
        Entry::Vacant(slot) => {
            slot.insert(entity);
            Ok(())
        }
    }
}
