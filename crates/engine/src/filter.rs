//! Per-account visit listing.
//!
//! Walks the account's relationship set, keeps visits inside the date
//! range whose place passes the country and distance predicates, and
//! returns them ordered by `visited_at`.

use std::ops::ControlFlow;
use visitdb_core::{AccountId, AccountVisit, EntityRef, Error, Result};
use visitdb_storage::Owner;

use crate::database::Database;
use crate::predicate::{FilterParams, VisitFilter};

impl Database {
    /// List the visits of an account, filtered by raw parameters.
    ///
    /// Recognised keys: `fromDate`, `toDate`, `country`, `toDistance`.
    /// An unknown account is reported before any parameter is parsed.
    pub fn visits_for_account<P>(&self, id: AccountId, params: &P) -> Result<Vec<AccountVisit>>
    where
        P: FilterParams + ?Sized,
    {
        self.require_account(id)?;
        let filter = VisitFilter::parse(params)?;
        Ok(self.collect_account_visits(id, &filter))
    }

    /// List the visits of an account with an already parsed filter.
    pub fn visits_for_account_with(
        &self,
        id: AccountId,
        filter: &VisitFilter,
    ) -> Result<Vec<AccountVisit>> {
        self.require_account(id)?;
        Ok(self.collect_account_visits(id, filter))
    }

    fn require_account(&self, id: AccountId) -> Result<()> {
        if self.accounts.contains(id) {
            Ok(())
        } else {
            Err(Error::not_found(EntityRef::Account(id)))
        }
    }

    /// Visits whose row or place cannot be resolved are skipped.
    fn collect_account_visits(&self, id: AccountId, filter: &VisitFilter) -> Vec<AccountVisit> {
        let mut rows = Vec::new();

        let _ = self.links.for_each_visit(Owner::Account(id), |visit_id| {
            let Some(visit) = self.visits.get(visit_id) else {
                tracing::trace!(visit_id, "Skipping unresolved visit");
                return ControlFlow::Continue(());
            };
            if !filter.dates.contains(visit.visited_at) {
                return ControlFlow::Continue(());
            }
            let Some(place) = self.places.get(visit.place) else {
                tracing::trace!(
                    visit_id,
                    place_id = visit.place,
                    "Skipping visit with unresolved place"
                );
                return ControlFlow::Continue(());
            };
            if filter.admits_place(&place) {
                rows.push(AccountVisit {
                    mark: visit.mark,
                    visited_at: visit.visited_at,
                    place: place.name.clone(),
                });
            }
            ControlFlow::Continue(())
        });

        // stable: equal timestamps keep enumeration order
        rows.sort_by_key(|row| row.visited_at);
        tracing::debug!(account_id = id, rows = rows.len(), "Listed account visits");
        rows
    }
}
