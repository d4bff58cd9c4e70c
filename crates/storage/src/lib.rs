//! Concurrent in-memory storage for visitdb
//!
//! - [`EntityStore`]: one sharded table per entity kind
//! - [`RelationshipIndex`]: per-account and per-place visit sets
//!
//! Both are built on DashMap with FxHash. Every operation locks at most
//! one shard, so unrelated keys never contend. There are no cross-key
//! transactions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity_store;
pub mod relationship;

pub use entity_store::EntityStore;
pub use relationship::{Owner, RelationshipIndex, VisitSet};

use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

/// Hasher used by every table in this crate.
pub(crate) type FxBuildHasher = BuildHasherDefault<FxHasher>;
