//! Public types for the visitdb API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Entities
pub use visitdb_core::{Account, AccountVisit, Gender, Place, Visit};

// Identifiers and time
pub use visitdb_core::{AccountId, PlaceId, Timestamp, VisitId};

// Errors
pub use visitdb_core::{EntityRef, Error, ErrorKind, RefField, Result};

// Engine
pub use visitdb_engine::{
    Clock, Database, DateRange, FilterParams, FixedClock, MarkFilter, StoreConfig, StoreStats,
    SystemClock, VisitFilter,
};

// Relationship set snapshots
pub use visitdb_storage::VisitSet;
