//! visitdb: in-memory store for accounts, places and visits
//!
//! A read-optimized backing store for a read-heavy service. Point
//! lookups go straight to sharded tables; the two query shapes walk a
//! per-owner visit index instead of scanning all visits.
//!
//! # Example
//!
//! ```
//! use visitdb::{Account, Database, Gender, Place, Visit};
//!
//! let db = Database::new();
//! db.new_account(Account { id: 1, birthdate: 0, gender: Gender::Male })?;
//! db.new_place(Place { id: 1, country: "X".into(), name: "Harbor".into(), distance: 10 })?;
//! db.new_visit(Visit { id: 1, account: 1, place: 1, visited_at: 100, mark: 5 })?;
//!
//! let rows = db.visits_for_account(1, &[("toDistance", "20")])?;
//! assert_eq!(rows[0].place, "Harbor");
//! assert_eq!(db.average_mark(1, &[("gender", "m")])?, 5.0);
//! # Ok::<(), visitdb::Error>(())
//! ```

pub mod types;

pub use types::*;
