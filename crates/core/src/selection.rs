//! Multi-row selection with click / ctrl-click / shift-click semantics.
//!
//! The selection tracks a set of record ids plus a single focused id (the
//! detail-pane target). Range selection resolves against the *current*
//! flattened row order, which the caller passes in; the anchor index is only
//! meaningful relative to the order at the time it was set. If the order
//! changes underneath a stale anchor, range results are unspecified but must
//! never panic (indices are clamped).
//!
//! Shift-click is **anchor-fixed**: the anchor stays at the last non-shift
//! click, and each shift-click replaces the previous range contribution
//! rather than accumulating. Selected ids outside the range at anchor time
//! are preserved.

use std::collections::HashSet;

use crate::record::RecordId;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<RecordId>,
    focused: Option<RecordId>,
    /// Index of the anchor row in the flattened order at the time it was set.
    anchor: Option<usize>,
    /// Selection snapshot taken when the anchor was set. Shift-click unions
    /// the active range onto this base, so repeated shift-clicks from the
    /// same anchor replace each other instead of accumulating.
    base: HashSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &HashSet<RecordId> {
        &self.selected
    }

    pub fn focused(&self) -> Option<RecordId> {
        self.focused
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear selection, focus, and anchor.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.base.clear();
        self.focused = None;
        self.anchor = None;
    }

    /// Simple click: selection becomes the singleton `{id}`, which also
    /// becomes the focus target; the anchor moves to `id`'s position.
    pub fn select(&mut self, id: RecordId, order: &[RecordId]) {
        self.selected.clear();
        self.selected.insert(id);
        self.focused = Some(id);
        self.re_anchor(id, order);
    }

    /// Ctrl/Cmd-click: toggle membership of `id` without touching other
    /// members. A lone survivor becomes the focus target.
    pub fn toggle(&mut self, id: RecordId, order: &[RecordId]) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        if self.selected.len() == 1 {
            self.focused = self.selected.iter().next().copied();
        }
        self.re_anchor(id, order);
    }

    /// Shift-click: select the base snapshot plus the inclusive range
    /// between the anchor and `id` in the current order. Degrades to a
    /// simple click when there is no anchor yet.
    pub fn extend_to(&mut self, id: RecordId, order: &[RecordId]) {
        let (Some(anchor), Some(target)) = (self.anchor, order.iter().position(|&r| r == id))
        else {
            self.select(id, order);
            return;
        };

        // A matched target implies a non-empty order, so the clamp below
        // cannot underflow. Stale anchor after a reorder may point past
        // the end; clamp.
        let anchor = anchor.min(order.len() - 1);
        let (lo, hi) = if anchor <= target {
            (anchor, target)
        } else {
            (target, anchor)
        };

        self.selected = self.base.clone();
        self.selected.extend(order[lo..=hi].iter().copied());
        if self.selected.len() == 1 {
            self.focused = self.selected.iter().next().copied();
        }
    }

    fn re_anchor(&mut self, id: RecordId, order: &[RecordId]) {
        self.anchor = order.iter().position(|&r| r == id);
        self.base = self.selected.clone();
    }
}
