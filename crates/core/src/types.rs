//! Entity types stored by the engine.
//!
//! Field names on the wire follow the payloads the HTTP layer receives:
//! accounts carry `birth_date`, visits reference `user` and `location`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an [`Account`].
pub type AccountId = u32;
/// Identifier of a [`Place`].
pub type PlaceId = u32;
/// Identifier of a [`Visit`].
pub type VisitId = u32;
/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Gender of an account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Serialized as `"m"`.
    #[serde(rename = "m")]
    Male,
    /// Serialized as `"f"`.
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// The single-letter form used in payloads and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Gender::Male),
            "f" => Ok(Gender::Female),
            _ => Err(()),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique positive identifier.
    pub id: AccountId,
    /// Date of birth in epoch seconds (may be negative).
    #[serde(rename = "birth_date")]
    pub birthdate: Timestamp,
    /// Gender of the account holder.
    pub gender: Gender,
}

/// A place that can be visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Unique positive identifier.
    pub id: PlaceId,
    /// Country name, compared by exact string equality.
    pub country: String,
    /// Display name.
    #[serde(rename = "place")]
    pub name: String,
    /// Distance metric used by `toDistance` filters.
    pub distance: i64,
}

/// One visit of an account to a place.
///
/// Visits are never edited after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Unique positive identifier.
    pub id: VisitId,
    /// The visiting account.
    #[serde(rename = "user")]
    pub account: AccountId,
    /// The visited place.
    #[serde(rename = "location")]
    pub place: PlaceId,
    /// When the visit happened, epoch seconds.
    pub visited_at: Timestamp,
    /// Rating given by the visitor.
    pub mark: u8,
}

/// A row of the per-account visit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountVisit {
    /// Rating given by the visitor.
    pub mark: u8,
    /// When the visit happened, epoch seconds.
    pub visited_at: Timestamp,
    /// Display name of the visited place.
    pub place: String,
}
