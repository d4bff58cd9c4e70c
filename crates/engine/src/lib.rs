//! Query engine for visitdb
//!
//! [`Database`] owns one [`EntityStore`](visitdb_storage::EntityStore)
//! per entity kind and the [`RelationshipIndex`](visitdb_storage::RelationshipIndex)
//! linking visits to their account and place. On top of that it answers
//! two query shapes:
//!
//! - [`Database::visits_for_account`]: filtered, time-ordered listing
//! - [`Database::average_mark`]: average mark left at a place
//!
//! Construct one `Database` at process start and share it by reference
//! or `Arc`; every method takes `&self`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod aggregate;
pub mod clock;
pub mod config;
mod database;
mod filter;
pub mod predicate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StoreConfig;
pub use database::{Database, StoreStats};
pub use predicate::{DateRange, FilterParams, MarkFilter, VisitFilter};
