//! Filter parameters and their typed predicate bundles.
//!
//! Raw parameters arrive as a string-keyed bag from the transport
//! layer. Each field is parsed on its own: an absent (or empty) field
//! disables that bound, a present field that fails to convert is an
//! [`Error::InvalidFilter`]. Unknown keys are ignored.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use visitdb_core::{Account, Error, Gender, Place, Result, Timestamp};

use crate::clock::shift_years;

/// A multi-valued, string-keyed parameter bag.
pub trait FilterParams {
    /// First value recorded for `key`.
    fn get_first(&self, key: &str) -> Option<&str>;
}

impl<P: FilterParams + ?Sized> FilterParams for &P {
    fn get_first(&self, key: &str) -> Option<&str> {
        (**self).get_first(key)
    }
}

impl FilterParams for HashMap<String, Vec<String>> {
    fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }
}

impl FilterParams for HashMap<String, String> {
    fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FilterParams for BTreeMap<String, String> {
    fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FilterParams for [(K, V)] {
    fn get_first(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> FilterParams for [(K, V); N] {
    fn get_first(&self, key: &str) -> Option<&str> {
        FilterParams::get_first(self.as_slice(), key)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FilterParams for Vec<(K, V)> {
    fn get_first(&self, key: &str) -> Option<&str> {
        FilterParams::get_first(self.as_slice(), key)
    }
}

/// Parameter names understood by the query operations.
pub mod keys {
    /// Exclusive lower bound on `visited_at`.
    pub const FROM_DATE: &str = "fromDate";
    /// Exclusive upper bound on `visited_at`.
    pub const TO_DATE: &str = "toDate";
    /// Place country equality.
    pub const COUNTRY: &str = "country";
    /// Exclusive upper bound on place distance.
    pub const TO_DISTANCE: &str = "toDistance";
    /// Minimum age in years.
    pub const FROM_AGE: &str = "fromAge";
    /// Age ceiling in years.
    pub const TO_AGE: &str = "toAge";
    /// Account gender equality.
    pub const GENDER: &str = "gender";
}

fn param<'a, P: FilterParams + ?Sized>(params: &'a P, key: &str) -> Option<&'a str> {
    params.get_first(key).filter(|v| !v.is_empty())
}

fn parse_number<N, P>(params: &P, field: &'static str) -> Result<Option<N>>
where
    N: FromStr,
    P: FilterParams + ?Sized,
{
    match param(params, field) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_filter(field, raw)),
    }
}

/// Open interval on `visited_at`. Both ends are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Visits must happen strictly after this instant.
    pub after: Option<Timestamp>,
    /// Visits must happen strictly before this instant.
    pub before: Option<Timestamp>,
}

impl DateRange {
    /// Parse `fromDate` and `toDate`.
    pub fn parse<P: FilterParams + ?Sized>(params: &P) -> Result<Self> {
        Ok(Self {
            after: parse_number(params, keys::FROM_DATE)?,
            before: parse_number(params, keys::TO_DATE)?,
        })
    }

    /// Whether `at` lies strictly inside the range.
    #[inline]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.after.map_or(true, |from| at > from) && self.before.map_or(true, |to| at < to)
    }
}

/// Predicates for listing an account's visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// `fromDate` / `toDate`
    pub dates: DateRange,
    /// Required place country.
    pub country: Option<String>,
    /// Places must be strictly closer than this.
    pub to_distance: Option<i64>,
}

impl VisitFilter {
    /// Parse from a parameter bag.
    pub fn parse<P: FilterParams + ?Sized>(params: &P) -> Result<Self> {
        Ok(Self {
            dates: DateRange::parse(params)?,
            country: param(params, keys::COUNTRY).map(str::to_string),
            to_distance: parse_number(params, keys::TO_DISTANCE)?,
        })
    }

    pub(crate) fn admits_place(&self, place: &Place) -> bool {
        self.country.as_deref().map_or(true, |c| place.country == c)
            && self.to_distance.map_or(true, |max| place.distance < max)
    }
}

/// Predicates for averaging the marks left at a place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkFilter {
    /// `fromDate` / `toDate`
    pub dates: DateRange,
    /// The visitor must have turned this age before now. Defaults to 0.
    pub from_age: i64,
    /// The visitor must turn this age after now.
    pub to_age: Option<i64>,
    /// Required visitor gender.
    pub gender: Option<Gender>,
}

impl MarkFilter {
    /// Parse from a parameter bag.
    pub fn parse<P: FilterParams + ?Sized>(params: &P) -> Result<Self> {
        let dates = DateRange::parse(params)?;
        let from_age: i64 = parse_number(params, keys::FROM_AGE)?.unwrap_or(0);
        let to_age: Option<i64> = parse_number(params, keys::TO_AGE)?;
        let gender = match param(params, keys::GENDER) {
            None => None,
            Some(raw) => Some(
                raw.parse::<Gender>()
                    .map_err(|_| Error::invalid_filter(keys::GENDER, raw))?,
            ),
        };
        Ok(Self {
            dates,
            from_age,
            to_age,
            gender,
        })
    }

    /// Age and gender checks against the reference instant `now`.
    ///
    /// A year count outside `i32`, or a shift that overflows, is decided
    /// by its sign: a huge lower bound is never reached, a huge upper
    /// bound is never passed.
    pub(crate) fn admits_account(&self, account: &Account, now: DateTime<Utc>) -> bool {
        let old_enough = match shift_by_age(account.birthdate, self.from_age) {
            Some(at) => at < now,
            None => self.from_age < 0,
        };
        let young_enough = self.to_age.map_or(true, |age| {
            match shift_by_age(account.birthdate, age) {
                Some(at) => at > now,
                None => age > 0,
            }
        });
        old_enough && young_enough && self.gender.map_or(true, |g| g == account.gender)
    }
}

fn shift_by_age(birthdate: Timestamp, years: i64) -> Option<DateTime<Utc>> {
    i32::try_from(years)
        .ok()
        .and_then(|years| shift_years(birthdate, years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bag(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in pairs {
            map.entry(k.to_string()).or_default().push(v.to_string());
        }
        map
    }

    fn account(birth_year: i32, gender: Gender) -> Account {
        Account {
            id: 1,
            birthdate: Utc.with_ymd_and_hms(birth_year, 6, 1, 0, 0, 0).unwrap().timestamp(),
            gender,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_bag_disables_everything() {
        let filter = VisitFilter::parse(&bag(&[])).unwrap();
        assert_eq!(filter, VisitFilter::default());

        let filter = MarkFilter::parse(&bag(&[])).unwrap();
        assert_eq!(filter, MarkFilter::default());
        assert_eq!(filter.from_age, 0);
        assert_eq!(filter.to_age, None);
    }

    #[test]
    fn empty_values_are_absent() {
        let filter = VisitFilter::parse(&[("fromDate", ""), ("country", "")]).unwrap();
        assert_eq!(filter, VisitFilter::default());
    }

    #[test]
    fn parses_visit_filter() {
        let filter = VisitFilter::parse(&bag(&[
            ("fromDate", "100"),
            ("toDate", "-5"),
            ("country", "Chile"),
            ("toDistance", "40"),
        ]))
        .unwrap();
        assert_eq!(filter.dates.after, Some(100));
        assert_eq!(filter.dates.before, Some(-5));
        assert_eq!(filter.country.as_deref(), Some("Chile"));
        assert_eq!(filter.to_distance, Some(40));
    }

    #[test]
    fn first_value_wins() {
        let filter = VisitFilter::parse(&bag(&[("fromDate", "1"), ("fromDate", "abc")])).unwrap();
        assert_eq!(filter.dates.after, Some(1));
    }

    #[test]
    fn unknown_keys_ignored() {
        assert!(VisitFilter::parse(&[("limit", "abc")]).is_ok());
    }

    #[test]
    fn numeric_failures_share_one_kind() {
        for field in ["fromDate", "toDate", "toDistance"] {
            let err = VisitFilter::parse(&[(field, "1.5")]).unwrap_err();
            assert_eq!(err.kind(), visitdb_core::ErrorKind::BadRequest);
            assert_eq!(
                err,
                Error::InvalidFilter {
                    field: match field {
                        "fromDate" => keys::FROM_DATE,
                        "toDate" => keys::TO_DATE,
                        _ => keys::TO_DISTANCE,
                    },
                    value: "1.5".to_string(),
                }
            );
        }
        for field in ["fromAge", "toAge", "fromDate"] {
            let err = MarkFilter::parse(&[(field, "ten")]).unwrap_err();
            assert_eq!(err.kind(), visitdb_core::ErrorKind::BadRequest);
        }
    }

    #[test]
    fn gender_must_be_m_or_f() {
        assert_eq!(
            MarkFilter::parse(&[("gender", "m")]).unwrap().gender,
            Some(Gender::Male)
        );
        assert_eq!(
            MarkFilter::parse(&[("gender", "f")]).unwrap().gender,
            Some(Gender::Female)
        );
        let err = MarkFilter::parse(&[("gender", "x")]).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { field: "gender", .. }));
    }

    #[test]
    fn visit_filter_ignores_age_keys() {
        assert!(VisitFilter::parse(&[("gender", "x"), ("fromAge", "y")]).is_ok());
    }

    #[test]
    fn date_range_is_strict() {
        let range = DateRange {
            after: Some(10),
            before: Some(20),
        };
        assert!(!range.contains(10));
        assert!(range.contains(11));
        assert!(range.contains(19));
        assert!(!range.contains(20));
        assert!(DateRange::default().contains(i64::MIN));
        assert!(DateRange::default().contains(i64::MAX));
    }

    #[test]
    fn place_predicates() {
        let place = Place {
            id: 1,
            country: "Peru".to_string(),
            name: "Market".to_string(),
            distance: 10,
        };
        assert!(VisitFilter::default().admits_place(&place));

        let mut filter = VisitFilter {
            to_distance: Some(10),
            ..Default::default()
        };
        assert!(!filter.admits_place(&place));
        filter.to_distance = Some(11);
        assert!(filter.admits_place(&place));

        filter.country = Some("Peru".to_string());
        assert!(filter.admits_place(&place));
        filter.country = Some("peru".to_string());
        assert!(!filter.admits_place(&place));
    }

    #[test]
    fn default_excludes_future_birthdates() {
        let unborn = account(2030, Gender::Male);
        assert!(!MarkFilter::default().admits_account(&unborn, now()));
        assert!(MarkFilter::default().admits_account(&account(1990, Gender::Male), now()));
    }

    #[test]
    fn age_window() {
        // Born 1990-06-01, so 30 at the reference instant.
        let a = account(1990, Gender::Female);

        let filter = MarkFilter {
            from_age: 30,
            ..Default::default()
        };
        assert!(filter.admits_account(&a, now()));

        let filter = MarkFilter {
            from_age: 31,
            ..Default::default()
        };
        assert!(!filter.admits_account(&a, now()));

        let filter = MarkFilter {
            to_age: Some(30),
            ..Default::default()
        };
        assert!(!filter.admits_account(&a, now()));

        let filter = MarkFilter {
            to_age: Some(31),
            ..Default::default()
        };
        assert!(filter.admits_account(&a, now()));
    }

    #[test]
    fn age_bounds_overflow_by_sign() {
        let a = account(1990, Gender::Male);
        let never = MarkFilter {
            from_age: 5_000_000,
            ..Default::default()
        };
        assert!(!never.admits_account(&a, now()));

        let always = MarkFilter {
            to_age: Some(5_000_000),
            ..Default::default()
        };
        assert!(always.admits_account(&a, now()));
    }

    #[test]
    fn ages_beyond_i32_parse() {
        let filter =
            MarkFilter::parse(&[("fromAge", "3000000000"), ("toAge", "-3000000000")]).unwrap();
        assert_eq!(filter.from_age, 3_000_000_000);
        assert_eq!(filter.to_age, Some(-3_000_000_000));
    }

    #[test]
    fn ages_beyond_i32_decided_by_sign() {
        let a = account(1990, Gender::Male);
        let from = |age| MarkFilter {
            from_age: age,
            ..Default::default()
        };
        let to = |age| MarkFilter {
            to_age: Some(age),
            ..Default::default()
        };

        assert!(!from(3_000_000_000).admits_account(&a, now()));
        assert!(from(-3_000_000_000).admits_account(&a, now()));
        assert!(to(3_000_000_000).admits_account(&a, now()));
        assert!(!to(-3_000_000_000).admits_account(&a, now()));
    }

    #[test]
    fn gender_predicate() {
        let filter = MarkFilter {
            gender: Some(Gender::Female),
            ..Default::default()
        };
        assert!(filter.admits_account(&account(1980, Gender::Female), now()));
        assert!(!filter.admits_account(&account(1980, Gender::Male), now()));
    }
}
