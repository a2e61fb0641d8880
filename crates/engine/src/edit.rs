//! Inline cell editing with optimistic commit and debounced persistence.
//!
//! State machine per cell: Idle → Editing → Committing → Idle, where
//! "Committing" is a debounced write the host carries out. Key invariants:
//! - At most one `EditSession` exists per grid; starting another drops it.
//! - At most one queued debounce per (record, field); a newer commit
//!   cancels and replaces the older one outright (the earlier write is
//!   never sent), but keeps the older write's pre-edit value so a later
//!   rollback restores the last *confirmed* value, not an optimistic one.
//! - Every commit bumps a per-cell version; a persistence response is only
//!   acted on if its version still matches the cell's latest, otherwise it
//!   is discarded as stale ("last local edit wins").
//! - A failed (or timed-out) non-bulk write reverts the field and raises a
//!   transient error flag; bulk write failures are only logged, the bulk
//!   refetch is their backstop.
//!
//! The controller never touches a clock or a socket: the host passes `now`
//! (milliseconds, any monotonic origin) and performs the `WriteRequest`s
//! that `poll` hands back.

use rustc_hash::FxHashMap;
use trellis_core::{RecordId, Value};

use crate::source::SourceError;
use crate::store::RecordStore;

/// Quiet period before an optimistic commit is sent to the backend.
pub const DEBOUNCE_MS: u64 = 500;
/// How long a cell's transient error flag stays visible.
pub const ERROR_FLAG_MS: u64 = 3_000;
/// In-flight writes older than this are treated as failed. A late response
/// for a timed-out ticket is discarded as stale.
pub const WRITE_TIMEOUT_MS: u64 = 10_000;

/// Composite key for one cell: (record id, field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub id: RecordId,
    pub field: String,
}

impl CellKey {
    pub fn new(id: RecordId, field: &str) -> Self {
        Self {
            id,
            field: field.to_string(),
        }
    }
}

/// The single open edit: one cell, its draft, and the value the draft
/// started from (for the no-op guard and Escape).
#[derive(Debug, Clone)]
pub struct EditSession {
    pub id: RecordId,
    pub field: String,
    pub draft: Value,
    pub original: Value,
}

/// A persistence call the host must perform, then answer via
/// `complete`.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub ticket: u64,
    pub id: RecordId,
    pub field: String,
    pub value: Value,
}

impl WriteRequest {
    /// The single-field subset to send to `RecordSource::patch`.
    pub fn fields(&self) -> std::collections::HashMap<String, Value> {
        let mut fields = std::collections::HashMap::new();
        fields.insert(self.field.clone(), self.value.clone());
        fields
    }
}

/// Outcome of committing the open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    /// No session was open.
    NoSession,
    /// Draft equaled the original value; no store change, no network.
    Noop,
    /// Optimistic value applied; a debounced write is now queued.
    Committed,
}

/// A write that reached a terminal state: confirmed, failed, timed out, or
/// displaced from the queue before it was ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettledWrite {
    pub bulk: bool,
}

#[derive(Debug, Clone)]
struct QueuedWrite {
    value: Value,
    /// Last confirmed value, for rollback.
    prev: Value,
    version: u64,
    due_at: u64,
    bulk: bool,
}

#[derive(Debug, Clone)]
struct InFlightWrite {
    key: CellKey,
    prev: Value,
    version: u64,
    sent_at: u64,
    bulk: bool,
}

/// Result of staging an optimistic write.
pub(crate) enum Staged {
    Queued,
    /// No record with this id; nothing staged.
    NoRecord,
}

#[derive(Debug, Default)]
pub struct EditController {
    session: Option<EditSession>,
    queued: FxHashMap<CellKey, QueuedWrite>,
    in_flight: FxHashMap<u64, InFlightWrite>,
    /// Latest issued edit version per cell (monotonic).
    versions: FxHashMap<CellKey, u64>,
    /// Error flag expiry per cell.
    error_flags: FxHashMap<CellKey, u64>,
    /// Writes settled since the last drain (for bulk bookkeeping).
    settled: Vec<SettledWrite>,
    next_ticket: u64,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Begin editing a cell. Any uncommitted session elsewhere is dropped.
    pub fn begin(&mut self, id: RecordId, field: &str, original: Value) {
        self.session = Some(EditSession {
            id,
            field: field.to_string(),
            draft: original.clone(),
            original,
        });
    }

    pub fn update_draft(&mut self, value: Value) {
        if let Some(session) = &mut self.session {
            session.draft = value;
        }
    }

    /// Escape: discard the draft, store untouched.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Commit the open session: no-op guard, optimistic merge, debounce.
    pub fn commit(&mut self, store: &mut RecordStore, now: u64) -> CommitResult {
        let Some(session) = self.session.take() else {
            return CommitResult::NoSession;
        };
        if session.draft == session.original {
            return CommitResult::Noop;
        }
        let key = CellKey::new(session.id, &session.field);
        match self.stage(store, key, session.draft, now + DEBOUNCE_MS, false) {
            Staged::NoRecord => CommitResult::Noop,
            Staged::Queued => CommitResult::Committed,
        }
    }

    /// Stage an optimistic write: merge into the store now, queue the
    /// persistence call for `due_at`, cancel-and-replace any queued write
    /// for the same cell.
    pub(crate) fn stage(
        &mut self,
        store: &mut RecordStore,
        key: CellKey,
        value: Value,
        due_at: u64,
        bulk: bool,
    ) -> Staged {
        let Some(merged_prev) = store.merge_field(key.id, &key.field, value.clone()) else {
            return Staged::NoRecord;
        };

        // A replaced queued write was never sent, so its pre-edit value is
        // still the last confirmed one; keep it for rollback. A displaced
        // bulk write counts as settled so its batch can still finish.
        let prev = match self.queued.remove(&key) {
            Some(old) => {
                if old.bulk {
                    self.settled.push(SettledWrite { bulk: true });
                }
                old.prev
            }
            None => merged_prev,
        };

        let version = self.bump_version(&key);
        self.queued.insert(
            key,
            QueuedWrite {
                value,
                prev,
                version,
                due_at,
                bulk,
            },
        );
        Staged::Queued
    }

    /// Advance time: expire error flags, time out stale in-flight writes,
    /// and promote due queued writes to in-flight, returning the requests
    /// the host must perform.
    pub fn poll(&mut self, store: &mut RecordStore, now: u64) -> Vec<WriteRequest> {
        self.error_flags.retain(|_, &mut clear_at| clear_at > now);

        let timed_out: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(_, w)| now >= w.sent_at + WRITE_TIMEOUT_MS)
            .map(|(&t, _)| t)
            .collect();
        for ticket in timed_out {
            log::warn!("write {} timed out; treating as failed", ticket);
            self.settle_failure(store, ticket, now);
        }

        let mut due: Vec<CellKey> = self
            .queued
            .iter()
            .filter(|(_, w)| w.due_at <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.sort();

        let mut requests = Vec::with_capacity(due.len());
        for key in due {
            let write = self.queued.remove(&key).expect("due key present");
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            requests.push(WriteRequest {
                ticket,
                id: key.id,
                field: key.field.clone(),
                value: write.value,
            });
            self.in_flight.insert(
                ticket,
                InFlightWrite {
                    key,
                    prev: write.prev,
                    version: write.version,
                    sent_at: now,
                    bulk: write.bulk,
                },
            );
        }
        requests
    }

    /// Report the outcome of a write the host performed.
    pub fn complete(
        &mut self,
        store: &mut RecordStore,
        ticket: u64,
        result: Result<(), SourceError>,
        now: u64,
    ) {
        match result {
            Ok(()) => {
                let Some(write) = self.in_flight.remove(&ticket) else {
                    // Already timed out; late confirmation is stale.
                    log::debug!("ignoring response for unknown ticket {}", ticket);
                    return;
                };
                self.settled.push(SettledWrite { bulk: write.bulk });
                // The optimistic value already reflects reality; never
                // overwrite the field from the server response, a newer
                // local edit may have superseded this write.
            }
            Err(err) => {
                if self.in_flight.contains_key(&ticket) {
                    log::warn!("write {} failed: {}", ticket, err);
                    self.settle_failure(store, ticket, now);
                } else {
                    log::debug!("ignoring failure for unknown ticket {}: {}", ticket, err);
                }
            }
        }
    }

    /// Rollback-and-flag path shared by failures and timeouts. Skips the
    /// rollback when a newer edit to the same cell has been issued since,
    /// and skips it entirely for bulk writes.
    fn settle_failure(&mut self, store: &mut RecordStore, ticket: u64, now: u64) {
        let Some(write) = self.in_flight.remove(&ticket) else {
            return;
        };
        self.settled.push(SettledWrite { bulk: write.bulk });
        if write.bulk {
            return;
        }
        let latest = self.versions.get(&write.key).copied().unwrap_or(0);
        if write.version != latest {
            log::debug!(
                "discarding stale failure for {:?} (version {} < {})",
                write.key,
                write.version,
                latest
            );
            return;
        }
        store.merge_field(write.key.id, &write.key.field, write.prev.clone());
        self.error_flags.insert(write.key, now + ERROR_FLAG_MS);
    }

    /// Is this cell currently showing a transient error marker?
    pub fn error_flagged(&self, id: RecordId, field: &str) -> bool {
        self.error_flags.contains_key(&CellKey::new(id, field))
    }

    /// Writes not yet settled (queued or in flight).
    pub fn pending_count(&self) -> usize {
        self.queued.len() + self.in_flight.len()
    }

    /// Drain writes settled since the last call.
    pub fn take_settled(&mut self) -> Vec<SettledWrite> {
        std::mem::take(&mut self.settled)
    }

    fn bump_version(&mut self, key: &CellKey) -> u64 {
        let version = self.versions.entry(key.clone()).or_insert(0);
        *version += 1;
        *version
    }
}
