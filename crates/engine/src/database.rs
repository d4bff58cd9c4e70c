//! Entity tables and the visit insertion protocol.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use visitdb_core::{
    Account, AccountId, EntityRef, Error, Place, PlaceId, RefField, Result, Visit, VisitId,
};
use visitdb_storage::{EntityStore, Owner, RelationshipIndex, VisitSet};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;

/// Entity counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Stored accounts.
    pub accounts: usize,
    /// Stored places.
    pub places: usize,
    /// Stored visits, linked or not.
    pub visits: usize,
}

/// The in-memory store of accounts, places and visits.
///
/// # Consistency
///
/// Each table gives per-key atomicity only. Inserting a visit writes the
/// visit row, then the account link, then the place link, and a reader
/// may observe any prefix of that sequence. Links are never retracted.
pub struct Database {
    pub(crate) accounts: EntityStore<Account>,
    pub(crate) places: EntityStore<Place>,
    pub(crate) visits: EntityStore<Visit>,
    pub(crate) links: RelationshipIndex,
    clock: Arc<dyn Clock>,
}

impl Database {
    /// Create an empty database using the wall clock.
    pub fn new() -> Self {
        Self {
            accounts: EntityStore::new(),
            places: EntityStore::new(),
            visits: EntityStore::new(),
            links: RelationshipIndex::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create an empty database from a configuration.
    pub fn with_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.initial_capacity;
        let db = match config.shard_amount {
            Some(shards) => Self {
                accounts: EntityStore::with_capacity_and_shard_amount(capacity, shards),
                places: EntityStore::with_capacity_and_shard_amount(capacity, shards),
                visits: EntityStore::with_capacity_and_shard_amount(capacity, shards),
                links: RelationshipIndex::new(),
                clock: config.clock(),
            },
            None => Self {
                accounts: EntityStore::with_capacity(capacity),
                places: EntityStore::with_capacity(capacity),
                visits: EntityStore::with_capacity(capacity),
                links: RelationshipIndex::new(),
                clock: config.clock(),
            },
        };
        tracing::info!(
            initial_capacity = capacity,
            shard_amount = ?config.shard_amount,
            reference_time = ?config.reference_time,
            "Database created"
        );
        Ok(db)
    }

    /// Replace the clock used for age predicates.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Store an account, replacing any account with the same id.
    pub fn new_account(&self, account: Account) -> Result<()> {
        tracing::debug!(account_id = account.id, "Inserting account");
        self.accounts.put(account.id, account);
        Ok(())
    }

    /// Look up an account.
    pub fn get_account(&self, id: AccountId) -> Result<Arc<Account>> {
        tracing::debug!(account_id = id, "Getting account");
        self.accounts
            .get(id)
            .ok_or_else(|| Error::not_found(EntityRef::Account(id)))
    }

    /// Accepts an account update. Updates are not applied; the stored
    /// account is left unchanged.
    pub fn update_account(&self, account: Account, id: AccountId) -> Result<()> {
        tracing::debug!(account_id = id, payload_id = account.id, "Ignoring account update");
        Ok(())
    }

    // =========================================================================
    // Places
    // =========================================================================

    /// Store a place, replacing any place with the same id.
    pub fn new_place(&self, place: Place) -> Result<()> {
        tracing::debug!(place_id = place.id, "Inserting place");
        self.places.put(place.id, place);
        Ok(())
    }

    /// Look up a place.
    pub fn get_place(&self, id: PlaceId) -> Result<Arc<Place>> {
        tracing::debug!(place_id = id, "Getting place");
        self.places
            .get(id)
            .ok_or_else(|| Error::not_found(EntityRef::Place(id)))
    }

    /// Accepts a place update. Updates are not applied.
    pub fn update_place(&self, place: Place, id: PlaceId) -> Result<()> {
        tracing::debug!(place_id = id, payload_id = place.id, "Ignoring place update");
        Ok(())
    }

    // =========================================================================
    // Visits
    // =========================================================================

    /// Store a visit and link it to its account and place.
    ///
    /// The visit row is written first and stays stored even when a
    /// reference fails. A missing account fails before the place is
    /// looked at. A missing place fails after the account link is in
    /// place, and that link is kept.
    pub fn new_visit(&self, visit: Visit) -> Result<()> {
        tracing::debug!(visit_id = visit.id, "Inserting visit");
        let (id, account_id, place_id) = (visit.id, visit.account, visit.place);
        self.visits.put(id, visit);

        if !self.accounts.contains(account_id) {
            tracing::warn!(visit_id = id, account_id, "Visit references missing account");
            return Err(Error::Reference {
                field: RefField::Account,
                id: account_id,
            });
        }
        self.links.add_visit_to_account(account_id, id);

        if !self.places.contains(place_id) {
            tracing::warn!(visit_id = id, place_id, "Visit references missing place");
            return Err(Error::Reference {
                field: RefField::Place,
                id: place_id,
            });
        }
        self.links.add_visit_to_place(place_id, id);
        Ok(())
    }

    /// Look up a visit.
    pub fn get_visit(&self, id: VisitId) -> Result<Arc<Visit>> {
        tracing::debug!(visit_id = id, "Getting visit");
        self.visits
            .get(id)
            .ok_or_else(|| Error::not_found(EntityRef::Visit(id)))
    }

    /// Accepts a visit update. Updates are not applied.
    pub fn update_visit(&self, visit: Visit, id: VisitId) -> Result<()> {
        tracing::debug!(visit_id = id, payload_id = visit.id, "Ignoring visit update");
        Ok(())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Snapshot of the visits linked to an account.
    pub fn account_visit_ids(&self, id: AccountId) -> VisitSet {
        self.links.visits(Owner::Account(id))
    }

    /// Snapshot of the visits linked to a place.
    pub fn place_visit_ids(&self, id: PlaceId) -> VisitSet {
        self.links.visits(Owner::Place(id))
    }

    /// Entity counts.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            accounts: self.accounts.len(),
            places: self.places.len(),
            visits: self.visits.len(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("accounts", &self.accounts.len())
            .field("places", &self.places.len())
            .field("visits", &self.visits.len())
            .field("links", &self.links)
            .finish()
    }
}
