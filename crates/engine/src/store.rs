//! The record store: the single shared mutable collection.
//!
//! An ordered list of records with an O(1) id index. All mutation goes
//! through either a full replace on refresh or a single-field shallow merge
//! on edit confirm/rollback. The load state keeps "no records" and "could
//! not load records" distinguishable.

use rustc_hash::FxHashMap;
use trellis_core::{Record, RecordId, Value};

/// Lifecycle of the backing collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Never fetched.
    Idle,
    /// A fetch is in flight; existing records stay visible meanwhile.
    Loading,
    Loaded,
    /// The last fetch failed. Distinct from an empty Loaded store.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    index: FxHashMap<RecordId, usize>,
    load_state: LoadState,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: FxHashMap::default(),
            load_state: LoadState::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.index.contains_key(&id)
    }

    /// Field value for a record; `Value::Null` for absent fields, `None`
    /// for absent records.
    pub fn field(&self, id: RecordId, field: &str) -> Option<&Value> {
        self.get(id).map(|r| r.get(field))
    }

    /// Mark a fetch in flight. Current records stay visible.
    pub fn begin_refresh(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Full replace from a completed fetch.
    pub fn install(&mut self, records: Vec<Record>) {
        self.records = records;
        self.rebuild_index();
        self.load_state = LoadState::Loaded;
    }

    /// Record a failed fetch. Current records stay in place.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.load_state = LoadState::Failed(message.into());
    }

    /// Single-field shallow merge. Returns the previous value, or `None`
    /// if no record has this id.
    pub fn merge_field(&mut self, id: RecordId, field: &str, value: Value) -> Option<Value> {
        let &i = self.index.get(&id)?;
        Some(self.records[i].set(field, value))
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        let mut dropped = 0usize;
        let mut keep = Vec::with_capacity(self.records.len());
        for record in self.records.drain(..) {
            if self.index.contains_key(&record.id) {
                dropped += 1;
                continue;
            }
            self.index.insert(record.id, keep.len());
            keep.push(record);
        }
        self.records = keep;
        if dropped > 0 {
            log::warn!("record store: dropped {} duplicate id(s) on install", dropped);
        }
    }
}
