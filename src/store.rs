//! Per-view state: the authoritative list and the derived list computed from it.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::loader::{Loaded, Source};
use crate::pipeline::{self, Direction, Query};
use crate::resource::{self, Resource};

/// A local change the server has not confirmed yet.
#[derive(Debug, Clone)]
pub enum PendingOp<R: Resource> {
    Create { local_id: i64, draft: R::Draft },
    Update { id: i64, draft: R::Draft },
    Delete { id: i64 },
}

impl<R: Resource> PendingOp<R> {
    pub fn id(&self) -> i64 {
        match self {
            PendingOp::Create { local_id, .. } => *local_id,
            PendingOp::Update { id, .. } | PendingOp::Delete { id } => *id,
        }
    }

    fn rekey(&mut self, to: i64) {
        match self {
            PendingOp::Create { local_id, .. } => *local_id = to,
            PendingOp::Update { id, .. } | PendingOp::Delete { id } => *id = to,
        }
    }
}

#[derive(Debug)]
pub struct ResourceStore<R: Resource> {
    pub(crate) records: Vec<R>,
    query: Query<R>,
    derived: Vec<R>,
    loading: bool,
    saving: usize,
    source: Option<Source>,
    pub(crate) banner: Option<String>,
    pub(crate) unsynced: BTreeSet<i64>,
    pub(crate) pending: VecDeque<PendingOp<R>>,
    clock: fn() -> DateTime<Utc>,
}

impl<R: Resource> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Store whose date filters and local timestamps read `clock` instead of the system time.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            records: Vec::new(),
            query: Query::default(),
            derived: Vec::new(),
            loading: false,
            saving: 0,
            source: None,
            banner: None,
            unsynced: BTreeSet::new(),
            pending: VecDeque::new(),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn derived(&self) -> &[R] {
        &self.derived
    }

    pub fn query(&self) -> &Query<R> {
        &self.query
    }

    pub fn get(&self, id: i64) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving > 0
    }

    pub fn source(&self) -> Option<Source> {
        self.source
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn is_unsynced(&self, id: i64) -> bool {
        self.unsynced.contains(&id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingOp<R>> {
        self.pending.iter()
    }

    pub fn next_id(&self) -> i64 {
        resource::next_id(&self.records)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
        self.recompute();
    }

    pub fn set_criteria(&mut self, criteria: R::Criteria) {
        self.query.criteria = criteria;
        self.recompute();
    }

    pub fn set_sort(&mut self, field: R::SortField, direction: Direction) {
        self.query.sort = field;
        self.query.direction = direction;
        self.recompute();
    }

    /// Column-header click: flips direction on the active field, else sorts the new
    /// field ascending.
    pub fn toggle_sort(&mut self, field: R::SortField) {
        if self.query.sort == field {
            self.query.direction = self.query.direction.reverse();
        } else {
            self.query.sort = field;
            self.query.direction = Direction::Asc;
        }
        self.recompute();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn begin_save(&mut self) {
        self.saving += 1;
    }

    pub(crate) fn end_save(&mut self) {
        self.saving = self.saving.saturating_sub(1);
    }

    /// Installs a load result as the new authoritative list.
    ///
    /// Queued pending ops survive; see [`ResourceStore::replace_all`].
    pub fn apply_loaded(&mut self, loaded: Loaded<Vec<R>>) {
        self.source = Some(loaded.source);
        self.banner = loaded.warning;
        self.loading = false;
        self.replace_all(loaded.data);
    }

    /// Records still waiting on a queued create are carried over. Unsynced marks
    /// are kept only for ids still present.
    pub fn replace_all(&mut self, records: Vec<R>) {
        let previous = std::mem::replace(&mut self.records, records);
        self.carry_local_creates(previous);
        let present: BTreeSet<i64> = self.records.iter().map(Resource::id).collect();
        self.unsynced.retain(|id| present.contains(id));
        self.recompute();
    }

    /// Re-adds local-only records after a reload, moving any whose id the reload now uses.
    fn carry_local_creates(&mut self, mut previous: Vec<R>) {
        let now = self.now();
        for op in self.pending.iter_mut() {
            let PendingOp::Create { local_id, draft } = op else {
                continue;
            };
            let Some(index) = previous.iter().position(|r| r.id() == *local_id) else {
                continue;
            };
            let record = previous.swap_remove(index);
            if !self.records.iter().any(|r| r.id() == *local_id) {
                self.records.push(record);
                continue;
            }
            let moved_to = resource::next_id(&self.records).max(resource::next_id(&previous));
            tracing::debug!(
                "Reload took {} #{}; keeping the unsynced record as #{}",
                R::LABEL,
                local_id,
                moved_to
            );
            self.unsynced.remove(local_id);
            self.unsynced.insert(moved_to);
            self.records.push(R::from_draft(moved_to, draft, now));
            *local_id = moved_to;
        }
    }

    pub(crate) fn upsert(&mut self, record: R) {
        match self.records.iter().position(|r| r.id() == record.id()) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        self.recompute();
    }

    /// Replaces the record stored under `id`, which may differ from the new record's id.
    pub(crate) fn replace(&mut self, id: i64, record: R) -> bool {
        match self.records.iter().position(|r| r.id() == id) {
            Some(index) => {
                self.records[index] = record;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Swaps a replayed create's local record for the server's copy.
    ///
    /// Ops queued against the local id meanwhile are moved to the server id. A
    /// record deleted locally during the replay is not brought back.
    pub(crate) fn promote(&mut self, local_id: i64, record: R) {
        let server_id = record.id();
        if let Some(index) = self.records.iter().position(|r| r.id() == local_id) {
            self.records.remove(index);
        }
        self.unsynced.remove(&local_id);
        let mut deleted = false;
        for op in self.pending.iter_mut().filter(|op| op.id() == local_id) {
            op.rekey(server_id);
            deleted |= matches!(op, PendingOp::Delete { .. });
            self.unsynced.insert(server_id);
        }
        if deleted {
            self.recompute();
        } else {
            self.upsert(record);
        }
    }

    pub(crate) fn remove(&mut self, id: i64) -> Option<R> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        let removed = self.records.remove(index);
        self.unsynced.remove(&id);
        self.recompute();
        Some(removed)
    }

    pub(crate) fn get_mut(&mut self, id: i64) -> Option<&mut R> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub(crate) fn recompute(&mut self) {
        self.derived = pipeline::derive(&self.records, &self.query, self.now());
    }
}
