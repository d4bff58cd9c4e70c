//! Core types for visitdb
//!
//! This crate defines the entity types shared by every layer:
//! - Account: a registered traveller
//! - Place: a location that can be visited
//! - Visit: one account visiting one place, with a mark
//!
//! It also owns the error taxonomy the engine reports to its callers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{EntityRef, Error, ErrorKind, RefField, Result};
pub use types::{
    Account, AccountId, AccountVisit, Gender, Place, PlaceId, Timestamp, Visit, VisitId,
};
