//! Sharded map keyed by entity id
//!
//! The id space is split into a fixed number of shards, each behind its
//! own reader/writer lock. Readers of different shards never contend and
//! a writer only blocks the 1/N of the keyspace that shares its shard.
//!
//! ```text
//! id 17, 4 shards → shard 1 ─ RwLock<HashMap<u32, V>>
//! id 18, 4 shards → shard 2 ─ RwLock<HashMap<u32, V>>
//! ```

use parking_lot::{RwLock, RwLockWriteGuard};
use std::collections::HashMap;

/// A `u32`-keyed map partitioned into independently locked shards
#[derive(Debug)]
pub struct ShardedMap<V> {
    shards: Box<[RwLock<HashMap<u32, V>>]>,
}

impl<V> ShardedMap<V> {
    /// Create a map with `shard_count` shards (at least one)
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard index owning `id`
    pub fn shard_of(&self, id: u32) -> usize {
        id as usize % self.shards.len()
    }

    fn shard(&self, id: u32) -> &RwLock<HashMap<u32, V>> {
        &self.shards[self.shard_of(id)]
    }

    /// Run `f` on the value stored under `id` while holding the shard's read lock
    pub fn read_with<R>(&self, id: u32, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.shard(id).read().get(&id).map(f)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.shard(id).read().contains_key(&id)
    }

    /// Exclusive access to the shard owning `id`
    ///
    /// Callers that must update several maps atomically take these guards
    /// in a fixed order and mutate only after all are held.
    pub fn write_shard(&self, id: u32) -> RwLockWriteGuard<'_, HashMap<u32, V>> {
        self.shard(id).write()
    }

    /// Total number of entries
    ///
    /// Shards are counted one at a time, so concurrent inserts may or may
    /// not be included.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }
}

impl<V: Clone> ShardedMap<V> {
    /// Get a clone of the value stored under `id`
    pub fn get(&self, id: u32) -> Option<V> {
        self.read_with(id, V::clone)
    }
}
