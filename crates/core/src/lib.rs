//! `trellis-core` — Core types for the Trellis record grid.
//!
//! Records, field descriptors, display items, and the selection model.
//! Pure data crate: no IO, no clock, no network.

pub mod display;
pub mod field;
pub mod record;
pub mod selection;
pub mod value;

pub use display::DisplayItem;
pub use field::{FieldDescriptor, FieldKind};
pub use record::{Record, RecordId};
pub use selection::Selection;
pub use value::{Value, ValueKey};
