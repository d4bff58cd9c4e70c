//! Sharded entity table
//!
//! # Design
//!
//! - DashMap: sharded, readers only take a shard read lock
//! - FxHash: identifiers are small integers, no need for SipHash
//! - `Arc<T>` values: a `get` hands out a shared handle, never a copy
//!
//! `put` overwrites silently. Uniqueness of identifiers is the
//! caller's concern.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use crate::FxBuildHasher;

/// Concurrent table of entities keyed by integer identifier.
///
/// # Thread Safety
///
/// All operations take `&self` and are safe to call from any number of
/// threads. Each call locks only the shard owning its key.
pub struct EntityStore<T> {
    entries: DashMap<u32, Arc<T>, FxBuildHasher>,
}

impl<T> EntityStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Create a store with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher::default()),
        }
    }

    /// Create a store with an explicit shard count.
    ///
    /// # Panics
    ///
    /// Panics if `shard_amount` is not a power of two greater than 1.
    /// Callers validate configuration before reaching this point.
    pub fn with_capacity_and_shard_amount(capacity: usize, shard_amount: usize) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                FxBuildHasher::default(),
                shard_amount,
            ),
        }
    }

    /// Store `value` under `id`, returning the entity it replaced.
    #[inline]
    pub fn put(&self, id: u32, value: T) -> Option<Arc<T>> {
        self.entries.insert(id, Arc::new(value))
    }

    /// Look up an entity.
    #[inline]
    pub fn get(&self, id: u32) -> Option<Arc<T>> {
        self.entries.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if an entity exists.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("len", &self.len())
            .finish()
    }
}
