//! Bulk actions: one field change applied to every selected record.
//!
//! Each selected record gets its own immediate (non-debounced) write, all
//! issued in the same poll batch. Individual failures are logged and
//! otherwise ignored; once the whole batch settles the selection is cleared
//! and one full refetch is requested. The refetch reconciles partial
//! failures; there is no per-row rollback.

/// Tracks one in-progress bulk batch by its unsettled write count.
#[derive(Debug, Default)]
pub struct BulkController {
    outstanding: usize,
    active: bool,
}

impl BulkController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start a batch of `count` writes. Overlapping batches merge: the
    /// selection clears and the refetch fires once everything is settled.
    /// A count of zero settles immediately.
    pub fn begin(&mut self, count: usize) -> bool {
        self.active = true;
        self.outstanding += count;
        self.finish_if_done()
    }

    /// Record `count` settled bulk writes. Returns true when the batch just
    /// finished (caller clears the selection and requests the refetch).
    pub fn on_settled(&mut self, count: usize) -> bool {
        if !self.active || count == 0 {
            return false;
        }
        self.outstanding = self.outstanding.saturating_sub(count);
        self.finish_if_done()
    }

    fn finish_if_done(&mut self) -> bool {
        if self.active && self.outstanding == 0 {
            self.active = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_settles_once() {
        let mut bulk = BulkController::new();
        assert!(!bulk.begin(3));
        assert!(bulk.is_active());

        assert!(!bulk.on_settled(2));
        assert!(bulk.on_settled(1));
        assert!(!bulk.is_active());
        // Further settles are ignored.
        assert!(!bulk.on_settled(1));
    }

    #[test]
    fn test_empty_batch_finishes_immediately() {
        let mut bulk = BulkController::new();
        assert!(bulk.begin(0));
        assert!(!bulk.is_active());
    }
}
