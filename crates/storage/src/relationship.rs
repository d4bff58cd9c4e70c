//! Relationship index: visits per account and per place.
//!
//! Each owner maps to a set of visit ids. Sets only grow; there is no
//! removal. Adding to an owner's set locks only that owner's shard, so
//! links for different accounts or places are written in parallel.
//!
//! [`RelationshipIndex::for_each_visit`] walks a set in place while
//! holding its shard's read guard. The visitor may read any other table
//! but must not write to this index. [`RelationshipIndex::visits`] hands
//! out a detached [`VisitSet`] copy instead.

use dashmap::DashMap;
use rustc_hash::FxHashSet;
use std::fmt;
use std::ops::ControlFlow;
use visitdb_core::{AccountId, PlaceId, VisitId};

use crate::FxBuildHasher;

/// The entity owning a relationship set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Visits made by an account.
    Account(AccountId),
    /// Visits that happened at a place.
    Place(PlaceId),
}

/// Owned snapshot of one relationship set.
///
/// Order of ids is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitSet {
    ids: FxHashSet<VisitId>,
}

impl VisitSet {
    /// Number of visit ids in the snapshot.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check if `visit` is a member.
    pub fn contains(&self, visit: VisitId) -> bool {
        self.ids.contains(&visit)
    }

    /// Iterate over the ids.
    pub fn iter(&self) -> impl Iterator<Item = VisitId> + '_ {
        self.ids.iter().copied()
    }

    /// Invoke `visitor` for every id until it returns `Break`.
    pub fn for_each<F>(&self, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(VisitId) -> ControlFlow<()>,
    {
        for &id in &self.ids {
            if visitor(id).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

#[derive(Default)]
struct LinkTable {
    sets: DashMap<u32, FxHashSet<VisitId>, FxBuildHasher>,
}

impl LinkTable {
    fn add(&self, owner: u32, visit: VisitId) -> bool {
        self.sets.entry(owner).or_default().insert(visit)
    }

    fn snapshot(&self, owner: u32) -> VisitSet {
        self.sets
            .get(&owner)
            .map(|set| VisitSet { ids: set.clone() })
            .unwrap_or_default()
    }

    fn walk<F>(&self, owner: u32, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(VisitId) -> ControlFlow<()>,
    {
        let Some(set) = self.sets.get(&owner) else {
            return ControlFlow::Continue(());
        };
        for &id in set.iter() {
            if visitor(id).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn len(&self) -> usize {
        self.sets.len()
    }
}

/// Secondary index from accounts and places to the visits referencing them.
///
/// Thread-safe; share it behind an `Arc` or inside the owning database.
#[derive(Default)]
pub struct RelationshipIndex {
    accounts: LinkTable,
    places: LinkTable,
}

impl RelationshipIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `visit` to `account`. Returns false if it was already linked.
    pub fn add_visit_to_account(&self, account: AccountId, visit: VisitId) -> bool {
        let added = self.accounts.add(account, visit);
        tracing::trace!(account_id = account, visit_id = visit, added, "Linked visit to account");
        added
    }

    /// Link `visit` to `place`. Returns false if it was already linked.
    pub fn add_visit_to_place(&self, place: PlaceId, visit: VisitId) -> bool {
        let added = self.places.add(place, visit);
        tracing::trace!(place_id = place, visit_id = visit, added, "Linked visit to place");
        added
    }

    /// Snapshot the relationship set of `owner`.
    ///
    /// An owner with no links yields an empty set.
    pub fn visits(&self, owner: Owner) -> VisitSet {
        match owner {
            Owner::Account(id) => self.accounts.snapshot(id),
            Owner::Place(id) => self.places.snapshot(id),
        }
    }

    /// Invoke `visitor` for every visit linked to `owner`.
    ///
    /// Returning `ControlFlow::Break` from the visitor stops the walk;
    /// the break is passed through to the caller. The owner's shard stays
    /// read-locked for the duration, so the visitor must not add links.
    pub fn for_each_visit<F>(&self, owner: Owner, visitor: F) -> ControlFlow<()>
    where
        F: FnMut(VisitId) -> ControlFlow<()>,
    {
        match owner {
            Owner::Account(id) => self.accounts.walk(id, visitor),
            Owner::Place(id) => self.places.walk(id, visitor),
        }
    }

    /// Number of accounts with at least one linked visit.
    pub fn linked_accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Number of places with at least one linked visit.
    pub fn linked_places(&self) -> usize {
        self.places.len()
    }
}

impl fmt::Debug for RelationshipIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipIndex")
            .field("linked_accounts", &self.linked_accounts())
            .field("linked_places", &self.linked_places())
            .finish()
    }
}
