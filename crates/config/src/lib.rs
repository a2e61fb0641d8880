//! Per-user preferences for the Trellis grid.

mod preferences;

pub use preferences::{Preferences, ViewMode};
