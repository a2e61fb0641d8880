//! `trellis-engine` — Record grid engine.
//!
//! Pure engine crate: receives records, projects display lists, and tracks
//! selection and optimistic edits. No IO and no clock of its own; the host
//! supplies a millisecond timestamp to the entry points that need one and
//! performs the network calls the engine requests via effects.

pub mod bulk;
pub mod edit;
pub mod grid;
pub mod page;
pub mod source;
pub mod store;
pub mod view;

#[cfg(test)]
pub mod harness;

pub use edit::{
    CellKey, CommitResult, EditSession, WriteRequest, DEBOUNCE_MS, ERROR_FLAG_MS, WRITE_TIMEOUT_MS,
};
pub use grid::{Effect, GridController};
pub use page::paginate;
pub use source::{RecordSource, SourceError};
pub use store::{LoadState, RecordStore};
pub use view::{project, SortOrder, ViewConfig, ViewOptions};
