//! The grid controller: one entity collection's worth of view state.
//!
//! Owns the record store, the view options, the selection, and the edit and
//! bulk controllers, and funnels everything the host needs to do through a
//! small effect protocol:
//!
//! - `poll(now)` returns `Effect`s: writes to perform and refetches to run.
//! - `complete_write` / `install_records` / `refresh_failed` report results.
//! - `pump` drives the loop synchronously against a `RecordSource` for
//!   hosts that block on IO.
//!
//! The controller never performs IO itself and never panics across its
//! public surface.

use trellis_core::{display, DisplayItem, Record, RecordId, Selection, Value};

use crate::bulk::BulkController;
use crate::edit::{CellKey, CommitResult, EditController, EditSession, WriteRequest, Staged};
use crate::page::paginate;
use crate::source::RecordSource;
use crate::store::{LoadState, RecordStore};
use crate::view::{project, SortOrder, ViewConfig, ViewOptions};

use rustc_hash::FxHashSet;
use trellis_core::ValueKey;

/// Something the host must do on the engine's behalf.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Perform this persistence call and report back via `complete_write`.
    Write(WriteRequest),
    /// Re-fetch the full collection and report back via `install_records`
    /// or `refresh_failed`.
    Refresh,
}

pub struct GridController {
    store: RecordStore,
    config: ViewConfig,
    options: ViewOptions,
    selection: Selection,
    edits: EditController,
    bulk: BulkController,
    refresh_queued: bool,
}

impl GridController {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            store: RecordStore::new(),
            config,
            options: ViewOptions::default(),
            selection: Selection::new(),
            edits: EditController::new(),
            bulk: BulkController::new(),
            refresh_queued: false,
        }
    }

    // -------------------------------------------------------------------------
    // Store and load lifecycle
    // -------------------------------------------------------------------------

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn load_state(&self) -> &LoadState {
        self.store.load_state()
    }

    /// Ask for a (re)fetch on the next poll.
    pub fn request_refresh(&mut self) {
        self.refresh_queued = true;
    }

    /// Install a completed fetch (full replace).
    pub fn install_records(&mut self, records: Vec<Record>) {
        self.store.install(records);
    }

    pub fn refresh_failed(&mut self, message: impl Into<String>) {
        self.store.fail(message);
    }

    // -------------------------------------------------------------------------
    // View state
    // -------------------------------------------------------------------------

    pub fn set_search(&mut self, query: &str) {
        self.options.search = query.to_string();
    }

    pub fn set_filter(&mut self, field: &str, allowed: FxHashSet<ValueKey>) {
        self.options.set_filter(field, allowed);
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.options.sort = sort;
    }

    pub fn set_group_by(&mut self, field: Option<&str>) {
        self.options.group_by = field.map(str::to_string);
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Current projection: headers and rows, unpaginated.
    pub fn display(&self) -> Vec<DisplayItem> {
        project(self.store.records(), &self.options, &self.config)
    }

    /// One page of the current projection.
    pub fn page(&self, page_size: usize, page_index: usize) -> Vec<DisplayItem> {
        paginate(&self.display(), page_size, page_index)
    }

    /// Flattened row order of the current projection (headers dropped).
    /// Selection ranges resolve against this.
    pub fn row_order(&self) -> Vec<RecordId> {
        display::row_order(&self.display())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn click(&mut self, id: RecordId) {
        let order = self.row_order();
        self.selection.select(id, &order);
    }

    pub fn ctrl_click(&mut self, id: RecordId) {
        let order = self.row_order();
        self.selection.toggle(id, &order);
    }

    pub fn shift_click(&mut self, id: RecordId) {
        let order = self.row_order();
        self.selection.extend_to(id, &order);
    }

    // -------------------------------------------------------------------------
    // Cell editing
    // -------------------------------------------------------------------------

    /// Start editing a cell. Returns false (and does nothing) for unknown
    /// records, unknown fields, and read-only fields.
    pub fn begin_edit(&mut self, id: RecordId, field: &str) -> bool {
        let editable = self
            .config
            .descriptor(field)
            .map(|d| d.editable)
            .unwrap_or(false);
        if !editable {
            return false;
        }
        let Some(original) = self.store.field(id, field).cloned() else {
            return false;
        };
        self.edits.begin(id, field, original);
        true
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edits.session()
    }

    pub fn update_draft(&mut self, value: Value) {
        self.edits.update_draft(value);
    }

    /// Blur or Enter on a text cell: commit the draft.
    pub fn commit_edit(&mut self, now: u64) -> CommitResult {
        self.edits.commit(&mut self.store, now)
    }

    /// Change event on a select cell: the new choice commits immediately,
    /// there is no ambiguous typed state to wait out.
    pub fn select_change(&mut self, value: Value, now: u64) -> CommitResult {
        let is_select = self
            .editing()
            .and_then(|s| self.config.descriptor(&s.field))
            .map(|d| d.is_select())
            .unwrap_or(false);
        if !is_select {
            return CommitResult::NoSession;
        }
        self.edits.update_draft(value);
        self.edits.commit(&mut self.store, now)
    }

    /// Escape: discard the draft, store untouched.
    pub fn cancel_edit(&mut self) {
        self.edits.cancel();
    }

    pub fn error_flagged(&self, id: RecordId, field: &str) -> bool {
        self.edits.error_flagged(id, field)
    }

    // -------------------------------------------------------------------------
    // Bulk actions
    // -------------------------------------------------------------------------

    /// Apply one field change to every selected record. Writes are staged
    /// immediately (no debounce) and go out together on the next poll.
    pub fn apply_to_selection(&mut self, field: &str, value: Value, now: u64) {
        let mut ids: Vec<RecordId> = self.selection.selected().iter().copied().collect();
        ids.sort();

        let mut staged = 0usize;
        for id in ids {
            match self.edits.stage(
                &mut self.store,
                CellKey::new(id, field),
                value.clone(),
                now,
                true,
            ) {
                Staged::Queued => staged += 1,
                Staged::NoRecord => {
                    log::warn!("bulk write skipped: no record {}", id);
                }
            }
        }
        if self.bulk.begin(staged) {
            self.finish_bulk();
        }
        // Staging may have displaced queued writes from an earlier batch.
        self.absorb_settled();
    }

    // -------------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------------

    /// Advance time and collect the work the host must perform.
    pub fn poll(&mut self, now: u64) -> Vec<Effect> {
        let requests = self.edits.poll(&mut self.store, now);
        self.absorb_settled();

        let mut effects: Vec<Effect> = requests.into_iter().map(Effect::Write).collect();
        if self.refresh_queued {
            self.refresh_queued = false;
            self.store.begin_refresh();
            effects.push(Effect::Refresh);
        }
        effects
    }

    /// Report the outcome of a `WriteRequest`. The server's record payload
    /// is deliberately dropped: the optimistic value already reflects the
    /// latest local edit and must not be clobbered by an older response.
    pub fn complete_write(
        &mut self,
        ticket: u64,
        result: Result<Record, crate::source::SourceError>,
        now: u64,
    ) {
        self.edits
            .complete(&mut self.store, ticket, result.map(|_| ()), now);
        self.absorb_settled();
    }

    /// Drive outstanding effects to quiescence against a blocking source.
    pub fn pump(&mut self, source: &dyn RecordSource, now: u64) {
        loop {
            let effects = self.poll(now);
            if effects.is_empty() {
                return;
            }
            for effect in effects {
                match effect {
                    Effect::Write(request) => {
                        let result = source.patch(request.id, &request.fields());
                        self.complete_write(request.ticket, result, now);
                    }
                    Effect::Refresh => match source.list() {
                        Ok(records) => self.install_records(records),
                        Err(err) => self.refresh_failed(err.to_string()),
                    },
                }
            }
        }
    }

    fn absorb_settled(&mut self) {
        let settled = self.edits.take_settled();
        let bulk_settled = settled.iter().filter(|s| s.bulk).count();
        if self.bulk.on_settled(bulk_settled) {
            self.finish_bulk();
        }
    }

    fn finish_bulk(&mut self) {
        self.selection.clear();
        self.refresh_queued = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{DEBOUNCE_MS, ERROR_FLAG_MS};
    use crate::harness::{campaign, campaign_config, Call, ScriptedSource};

    fn loaded_grid(records: Vec<Record>) -> GridController {
        let mut grid = GridController::new(campaign_config());
        grid.install_records(records);
        grid
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_initial_load_via_pump() {
        let source = ScriptedSource::new(vec![
            campaign(1, "Spring", "Active"),
            campaign(2, "Fall", "Paused"),
        ]);
        let mut grid = GridController::new(campaign_config());

        grid.request_refresh();
        grid.pump(&source, 0);

        assert_eq!(grid.load_state(), &LoadState::Loaded);
        assert_eq!(grid.store().len(), 2);
        assert_eq!(source.list_count(), 1);
    }

    #[test]
    fn test_failed_load_is_distinct_from_empty() {
        let source = ScriptedSource::new(Vec::new());
        source.fail_list(true);
        let mut grid = GridController::new(campaign_config());

        grid.request_refresh();
        grid.pump(&source, 0);

        assert!(matches!(grid.load_state(), LoadState::Failed(_)));
        assert!(grid.store().is_empty());
    }

    #[test]
    fn test_noop_edit_never_reaches_network() {
        let source = ScriptedSource::new(vec![campaign(1, "Spring", "Active")]);
        let mut grid = loaded_grid(vec![campaign(1, "Spring", "Active")]);

        assert!(grid.begin_edit(RecordId(1), "name"));
        grid.update_draft(text("Spring"));
        assert_eq!(grid.commit_edit(0), CommitResult::Noop);
        grid.pump(&source, DEBOUNCE_MS);

        assert_eq!(source.patch_count(), 0);
    }

    #[test]
    fn test_edit_flow_persists_one_patch() {
        let source = ScriptedSource::new(vec![campaign(1, "Spring", "Active")]);
        let mut grid = loaded_grid(vec![campaign(1, "Spring", "Active")]);

        grid.click(RecordId(1));
        assert!(grid.begin_edit(RecordId(1), "name"));
        grid.update_draft(text("Spring Relaunch"));
        assert_eq!(grid.commit_edit(0), CommitResult::Committed);

        // Optimistic immediately, nothing on the wire inside the quiet period.
        assert_eq!(
            grid.store().field(RecordId(1), "name").unwrap().as_str(),
            Some("Spring Relaunch")
        );
        grid.pump(&source, DEBOUNCE_MS - 1);
        assert_eq!(source.patch_count(), 0);

        grid.pump(&source, DEBOUNCE_MS);
        assert_eq!(source.patch_count(), 1);
        match &source.calls()[0] {
            Call::Patch { id, fields } => {
                assert_eq!(*id, RecordId(1));
                assert_eq!(fields["name"].as_str(), Some("Spring Relaunch"));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_read_only_and_unknown_cells_reject_edit() {
        let mut grid = loaded_grid(vec![campaign(1, "Spring", "Active")]);

        assert!(!grid.begin_edit(RecordId(1), "account_name"));
        assert!(!grid.begin_edit(RecordId(1), "nonexistent"));
        assert!(!grid.begin_edit(RecordId(9), "name"));
        assert!(grid.editing().is_none());
    }

    #[test]
    fn test_select_change_commits_on_change() {
        let mut grid = loaded_grid(vec![campaign(1, "Spring", "Active")]);

        assert!(grid.begin_edit(RecordId(1), "status"));
        assert_eq!(grid.select_change(text("Paused"), 0), CommitResult::Committed);
        assert_eq!(
            grid.store().field(RecordId(1), "status").unwrap().as_str(),
            Some("Paused")
        );

        // A text cell has no change event; select_change does nothing there.
        assert!(grid.begin_edit(RecordId(1), "name"));
        assert_eq!(grid.select_change(text("x"), 0), CommitResult::NoSession);
    }

    #[test]
    fn test_failed_patch_reverts_and_flags() {
        let source = ScriptedSource::new(vec![campaign(1, "Spring", "Active")]);
        source.fail_next_patches(1);
        let mut grid = loaded_grid(vec![campaign(1, "Spring", "Active")]);

        grid.begin_edit(RecordId(1), "name");
        grid.update_draft(text("Summer"));
        grid.commit_edit(0);
        grid.pump(&source, DEBOUNCE_MS);

        assert_eq!(
            grid.store().field(RecordId(1), "name").unwrap().as_str(),
            Some("Spring")
        );
        assert!(grid.error_flagged(RecordId(1), "name"));

        grid.pump(&source, DEBOUNCE_MS + ERROR_FLAG_MS);
        assert!(!grid.error_flagged(RecordId(1), "name"));
    }

    #[test]
    fn test_bulk_clears_selection_and_refetches_once() {
        let source = ScriptedSource::new(vec![
            campaign(1, "A", "Active"),
            campaign(2, "B", "Active"),
            campaign(3, "C", "Active"),
        ]);
        let mut grid = loaded_grid(vec![
            campaign(1, "A", "Active"),
            campaign(2, "B", "Active"),
            campaign(3, "C", "Active"),
        ]);

        grid.click(RecordId(1));
        grid.ctrl_click(RecordId(2));
        // First patch (record 1) fails; the refetch is the backstop.
        source.fail_next_patches(1);
        grid.apply_to_selection("status", text("Completed"), 0);
        grid.pump(&source, 0);

        assert!(grid.selection().is_empty());
        assert_eq!(source.patch_count(), 2);
        assert_eq!(source.list_count(), 1);

        // Store reflects server truth after the refetch: the failed row
        // self-healed back, the successful one kept its change.
        assert_eq!(
            grid.store().field(RecordId(1), "status").unwrap().as_str(),
            Some("Active")
        );
        assert_eq!(
            grid.store().field(RecordId(2), "status").unwrap().as_str(),
            Some("Completed")
        );
    }

    #[test]
    fn test_shift_click_ranges_over_grouped_order() {
        let mut grid = loaded_grid(vec![
            campaign(1, "a", "Active"),
            campaign(2, "b", "Paused"),
            campaign(3, "c", "Active"),
        ]);
        grid.set_group_by(Some("status"));

        // Grouped, flattened order is [1, 3, 2].
        assert_eq!(
            grid.row_order(),
            vec![RecordId(1), RecordId(3), RecordId(2)]
        );
        grid.click(RecordId(1));
        grid.shift_click(RecordId(2));
        assert_eq!(grid.selection().len(), 3);
    }

    #[test]
    fn test_page_of_projection() {
        let mut grid = loaded_grid(vec![
            campaign(1, "a", "Active"),
            campaign(2, "b", "Active"),
            campaign(3, "c", "Paused"),
        ]);
        grid.set_group_by(Some("status"));

        let page = grid.page(2, 1);
        assert_eq!(
            page,
            vec![DisplayItem::header("Paused", 1), DisplayItem::row(3)]
        );
    }
}
