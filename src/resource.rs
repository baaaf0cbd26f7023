//! Schema every list view is parameterised over.
//!
//! A resource names its endpoint, which string fields text search looks at,
//! how each sortable column maps to a comparable key, its categorical filters,
//! and the sample rows shown when the API cannot be reached.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::pipeline::Direction;

/// Comparable value for one sortable column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
    Time(DateTime<Utc>),
}

/// Categorical predicates for one resource type.
pub trait Filter<R>: Clone + Debug + Default {
    fn admits(&self, record: &R, now: DateTime<Utc>) -> bool;
}

pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment under the API base, e.g. `items`.
    const ENDPOINT: &'static str;
    /// Singular, human-readable name used in warnings.
    const LABEL: &'static str;

    type Draft: Clone + Debug + Serialize + Send + Sync + 'static;
    type SortField: Copy + Debug + PartialEq + Send + Sync + 'static;
    type Criteria: Filter<Self> + Send + Sync + 'static;

    fn id(&self) -> i64;

    fn search_fields(&self) -> Vec<&str>;

    fn sort_key(&self, field: Self::SortField) -> SortKey<'_>;

    fn default_sort() -> (Self::SortField, Direction);

    /// Deterministic fallback rows.
    fn samples() -> Vec<Self>;

    /// Builds the local record for a create the server never confirmed.
    fn from_draft(id: i64, draft: &Self::Draft, now: DateTime<Utc>) -> Self;
}

/// Resources the API lets us edit in place.
pub trait Updatable: Resource {
    /// Patches the record from the draft and bumps `updated_at` to `now`.
    fn apply_draft(&mut self, draft: &Self::Draft, now: DateTime<Utc>);
}

/// Resources the API lets us delete.
pub trait Deletable: Resource {}

/// `max(id) + 1`, or 1 for an empty collection.
pub fn next_id<R: Resource>(records: &[R]) -> i64 {
    records.iter().map(Resource::id).max().unwrap_or(0) + 1
}

/// Criteria for resources without categorical filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCriteria;

impl<R> Filter<R> for NoCriteria {
    fn admits(&self, _record: &R, _now: DateTime<Utc>) -> bool {
        true
    }
}
