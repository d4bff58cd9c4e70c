//! Average mark at a place.

use std::ops::ControlFlow;
use visitdb_core::{EntityRef, Error, PlaceId, Result};
use visitdb_storage::Owner;

use crate::database::Database;
use crate::predicate::{FilterParams, MarkFilter};

impl Database {
    /// Average mark left at a place, filtered by raw parameters.
    ///
    /// Recognised keys: `fromDate`, `toDate`, `fromAge`, `toAge`, `gender`.
    /// Returns exactly `0.0` when no visit matches.
    pub fn average_mark<P>(&self, id: PlaceId, params: &P) -> Result<f64>
    where
        P: FilterParams + ?Sized,
    {
        self.require_place(id)?;
        let filter = MarkFilter::parse(params)?;
        Ok(self.compute_average(id, &filter))
    }

    /// Average mark with an already parsed filter.
    pub fn average_mark_with(&self, id: PlaceId, filter: &MarkFilter) -> Result<f64> {
        self.require_place(id)?;
        Ok(self.compute_average(id, filter))
    }

    fn require_place(&self, id: PlaceId) -> Result<()> {
        if self.places.contains(id) {
            Ok(())
        } else {
            Err(Error::not_found(EntityRef::Place(id)))
        }
    }

    fn compute_average(&self, id: PlaceId, filter: &MarkFilter) -> f64 {
        // Age bounds move with the clock; read it once per query.
        let now = self.now();
        let mut sum: u64 = 0;
        let mut count: u64 = 0;

        let _ = self.links.for_each_visit(Owner::Place(id), |visit_id| {
            let Some(visit) = self.visits.get(visit_id) else {
                return ControlFlow::Continue(());
            };
            if !filter.dates.contains(visit.visited_at) {
                return ControlFlow::Continue(());
            }
            let Some(account) = self.accounts.get(visit.account) else {
                tracing::trace!(
                    visit_id,
                    account_id = visit.account,
                    "Skipping visit with unresolved account"
                );
                return ControlFlow::Continue(());
            };
            if filter.admits_account(&account, now) {
                sum += u64::from(visit.mark);
                count += 1;
            }
            ControlFlow::Continue(())
        });

        tracing::debug!(place_id = id, sum, count, "Averaged place marks");
        if count == 0 {
            return 0.0;
        }
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use visitdb_core::{Account, Gender, Place, Visit};

    fn born(year: i32) -> i64 {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap().timestamp()
    }

    /// Reference instant 2020-07-01; accounts aged 10, 30 and 50.
    fn db() -> Database {
        let db = Database::new().with_clock(FixedClock::new(
            Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap(),
        ));
        for (id, year, gender) in [
            (1, 2010, Gender::Male),
            (2, 1990, Gender::Female),
            (3, 1970, Gender::Male),
        ] {
            db.new_account(Account {
                id,
                birthdate: born(year),
                gender,
            })
            .unwrap();
        }
        db.new_place(Place {
            id: 1,
            country: "Japan".to_string(),
            name: "Temple".to_string(),
            distance: 5,
        })
        .unwrap();
        db.new_place(Place {
            id: 2,
            country: "Japan".to_string(),
            name: "Empty".to_string(),
            distance: 5,
        })
        .unwrap();
        // account 1 leaves mark 1, account 2 mark 3, account 3 mark 5
        for (id, account, at, mark) in [(1, 1, 100, 1), (2, 2, 200, 3), (3, 3, 300, 5)] {
            db.new_visit(Visit {
                id,
                account,
                place: 1,
                visited_at: at,
                mark,
            })
            .unwrap();
        }
        db
    }

    fn no_params() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn unknown_place() {
        let err = db().average_mark(9, &no_params()).unwrap_err();
        assert_eq!(err, Error::not_found(EntityRef::Place(9)));
    }

    #[test]
    fn unknown_place_wins_over_bad_params() {
        let err = db().average_mark(9, &[("gender", "x")]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn bad_params() {
        let db = db();
        assert!(matches!(
            db.average_mark(1, &[("gender", "x")]),
            Err(Error::InvalidFilter { field: "gender", .. })
        ));
        assert!(matches!(
            db.average_mark(1, &[("fromAge", "old")]),
            Err(Error::InvalidFilter { .. })
        ));
    }

    #[test]
    fn unfiltered_average() {
        assert_eq!(db().average_mark(1, &no_params()).unwrap(), 3.0);
    }

    #[test]
    fn empty_population_is_zero() {
        let db = db();
        assert_eq!(db.average_mark(2, &no_params()).unwrap(), 0.0);
        assert_eq!(db.average_mark(1, &[("fromDate", "1000")]).unwrap(), 0.0);
    }

    #[test]
    fn date_bounds_are_exclusive() {
        let db = db();
        let avg = db
            .average_mark(1, &[("fromDate", "100"), ("toDate", "300")])
            .unwrap();
        assert_eq!(avg, 3.0);
    }

    #[test]
    fn age_filters() {
        let db = db();
        assert_eq!(db.average_mark(1, &[("fromAge", "20")]).unwrap(), 4.0);
        assert_eq!(db.average_mark(1, &[("toAge", "40")]).unwrap(), 2.0);
        assert_eq!(
            db.average_mark(1, &[("fromAge", "20"), ("toAge", "40")]).unwrap(),
            3.0
        );
        assert_eq!(db.average_mark(1, &[("fromAge", "60")]).unwrap(), 0.0);
    }

    #[test]
    fn gender_filter() {
        let db = db();
        assert_eq!(db.average_mark(1, &[("gender", "m")]).unwrap(), 3.0);
        assert_eq!(db.average_mark(1, &[("gender", "f")]).unwrap(), 3.0);
        assert_eq!(
            db.average_mark(1, &[("gender", "m"), ("toAge", "20")]).unwrap(),
            1.0
        );
    }

    #[test]
    fn fractional_average() {
        let db = db();
        let filter = MarkFilter {
            gender: Some(Gender::Male),
            dates: crate::DateRange {
                after: None,
                before: Some(400),
            },
            ..Default::default()
        };
        db.new_visit(Visit {
            id: 4,
            account: 1,
            place: 1,
            visited_at: 350,
            mark: 0,
        })
        .unwrap();
        // marks 1, 5, 0 from male accounts
        assert_eq!(db.average_mark_with(1, &filter).unwrap(), 2.0);
        db.new_visit(Visit {
            id: 5,
            account: 3,
            place: 1,
            visited_at: 360,
            mark: 4,
        })
        .unwrap();
        assert_eq!(db.average_mark_with(1, &filter).unwrap(), 2.5);
    }

    #[test]
    fn age_follows_the_clock() {
        let db = db().with_clock(FixedClock::new(
            Utc.with_ymd_and_hms(2045, 7, 1, 0, 0, 0).unwrap(),
        ));
        // account 1 is now 35
        assert_eq!(
            db.average_mark(1, &[("fromAge", "30"), ("toAge", "40")]).unwrap(),
            1.0
        );
    }

    #[test]
    fn ages_beyond_i32_are_not_parse_errors() {
        let db = db();
        assert_eq!(db.average_mark(1, &[("fromAge", "3000000000")]).unwrap(), 0.0);
        assert_eq!(db.average_mark(1, &[("toAge", "3000000000")]).unwrap(), 3.0);
        assert_eq!(db.average_mark(1, &[("fromAge", "-3000000000")]).unwrap(), 3.0);
    }

    #[test]
    fn skips_unresolvable_visits() {
        let db = Database::new();
        db.new_account(Account {
            id: 1,
            birthdate: 0,
            gender: Gender::Female,
        })
        .unwrap();
        db.new_place(Place {
            id: 1,
            country: "Norway".to_string(),
            name: "Fjord".to_string(),
            distance: 20,
        })
        .unwrap();
        db.new_visit(Visit {
            id: 1,
            account: 1,
            place: 1,
            visited_at: 10,
            mark: 4,
        })
        .unwrap();

        // row stored and linked to the place, but its account never existed
        db.visits.put(
            2,
            Visit {
                id: 2,
                account: 99,
                place: 1,
                visited_at: 20,
                mark: 0,
            },
        );
        db.links.add_visit_to_place(1, 2);
        // link with no row behind it
        db.links.add_visit_to_place(1, 3);

        assert_eq!(db.place_visit_ids(1).len(), 3);
        assert_eq!(db.average_mark(1, &no_params()).unwrap(), 4.0);
    }
}
