//! Error types for visitdb
//!
//! Three kinds of failure reach the caller of a store operation:
//! an identifier that does not resolve, a filter parameter that cannot
//! be converted, and a visit that names a missing account or place.
//! None of them are transient, so nothing is retried internally.

use std::fmt;
use thiserror::Error;

use crate::types::{AccountId, PlaceId, VisitId};

/// Result type alias for visitdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reference to a single stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// An account by id.
    Account(AccountId),
    /// A place by id.
    Place(PlaceId),
    /// A visit by id.
    Visit(VisitId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Account(id) => write!(f, "account/{}", id),
            EntityRef::Place(id) => write!(f, "place/{}", id),
            EntityRef::Visit(id) => write!(f, "visit/{}", id),
        }
    }
}

/// The reference field of a visit that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefField {
    /// `Visit::account`
    Account,
    /// `Visit::place`
    Place,
}

impl fmt::Display for RefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefField::Account => f.write_str("account"),
            RefField::Place => f.write_str("place"),
        }
    }
}

/// Coarse classification of an [`Error`].
///
/// A transport layer maps each kind to one response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed entity does not exist.
    NotFound,
    /// A filter parameter is malformed.
    BadRequest,
    /// A visit references a missing account or place.
    Reference,
    /// The store configuration is invalid.
    Config,
}

/// Errors returned by store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The identifier does not resolve in the relevant store.
    #[error("not found: {entity}")]
    NotFound {
        /// The entity that was looked up
        entity: EntityRef,
    },

    /// A filter parameter is present but cannot be converted.
    ///
    /// Every field reports through this variant; `field` is kept for
    /// diagnostics only.
    #[error("cannot parse filter {field}: {value:?}")]
    InvalidFilter {
        /// Parameter name, e.g. `fromDate`
        field: &'static str,
        /// The raw value that was rejected
        value: String,
    },

    /// A visit names an account or place that does not exist.
    #[error("visit references missing {field} {id}")]
    Reference {
        /// Which reference failed
        field: RefField,
        /// The unresolved identifier
        id: u32,
    },

    /// The store configuration could not be loaded or is invalid.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

impl Error {
    /// Not-found error for the given entity.
    pub fn not_found(entity: EntityRef) -> Self {
        Error::NotFound { entity }
    }

    /// Filter parse error for `field`.
    pub fn invalid_filter(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidFilter {
            field,
            value: value.into(),
        }
    }

    /// Configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidFilter { .. } => ErrorKind::BadRequest,
            Error::Reference { .. } => ErrorKind::Reference,
            Error::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether this is a [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
