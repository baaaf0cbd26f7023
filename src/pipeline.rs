//! Filter/sort pipeline: authoritative list in, derived list out.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};

use crate::resource::{Filter, Resource, SortKey};

/// Sentinel a UI select uses for "no filter".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// Categorical filter value; `All` passes every record through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> Selection<T> {
    /// Parses a select value, treating `"all"` as the pass-through sentinel.
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        if raw == ALL {
            return Ok(Selection::All);
        }
        raw.parse().map(Selection::Only)
    }
}

/// Relative date window for transactions, counted back from today's midnight. Lower bound only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl Period {
    pub fn lower_bound(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc());
        match self {
            Period::All => None,
            Period::Today => today,
            Period::Week => today.map(|midnight| midnight - Duration::days(7)),
            Period::Month => today.and_then(|midnight| midnight.checked_sub_months(Months::new(1))),
        }
    }

    pub fn admits(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.lower_bound(now).map_or(true, |bound| at >= bound)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ALL => Ok(Period::All),
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

/// Everything that shapes the derived list.
#[derive(Debug, Clone)]
pub struct Query<R: Resource> {
    pub search: String,
    pub criteria: R::Criteria,
    pub sort: R::SortField,
    pub direction: Direction,
}

impl<R: Resource> Default for Query<R> {
    fn default() -> Self {
        let (sort, direction) = R::default_sort();
        Query {
            search: String::new(),
            criteria: R::Criteria::default(),
            sort,
            direction,
        }
    }
}

impl<R: Resource> Query<R> {
    pub fn admits(&self, record: &R, now: DateTime<Utc>) -> bool {
        matches_search(record, &self.search) && self.criteria.admits(record, now)
    }
}

/// Case-insensitive substring match on any searchable field. Blank terms match.
pub fn matches_search<R: Resource>(record: &R, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Filters then sorts `records` into a new list. The input is left untouched.
pub fn derive<R: Resource>(records: &[R], query: &Query<R>, now: DateTime<Utc>) -> Vec<R> {
    let mut derived: Vec<R> = records
        .iter()
        .filter(|record| query.admits(record, now))
        .cloned()
        .collect();
    sort_records(&mut derived, query.sort, query.direction);
    derived
}

/// Stable sort, so equal keys keep their authoritative order in either direction.
pub fn sort_records<R: Resource>(records: &mut [R], field: R::SortField, direction: Direction) {
    records.sort_by(|a, b| {
        let ord = compare_keys(&a.sort_key(field), &b.sort_key(field));
        match direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });
}

pub fn compare_keys(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => collate(a, b),
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
        (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(key: &SortKey<'_>) -> u8 {
    match key {
        SortKey::Text(_) => 0,
        SortKey::Number(_) => 1,
        SortKey::Time(_) => 2,
    }
}

/// Case-folded comparison; case only breaks ties, lowercase first.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| b.cmp(a))
}
