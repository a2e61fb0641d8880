//! The persistence collaborator boundary.
//!
//! The engine only ever talks to its backend through this trait: a full
//! collection fetch plus record-level CRUD. Implementations live elsewhere
//! (`trellis-api` provides the REST one); tests use a scripted mock.

use std::collections::HashMap;
use std::fmt;

use trellis_core::{Record, RecordId, Value};

/// Error from a persistence call. The engine treats all failures alike
/// (revert-and-flag for cell writes, log-and-refetch for bulk), so the
/// payload is just a message for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {}

/// Abstract persistence collaborator for one entity collection.
pub trait RecordSource {
    /// Full collection fetch.
    fn list(&self) -> Result<Vec<Record>, SourceError>;

    /// Partial update; must fail fast on any non-success response.
    fn patch(
        &self,
        id: RecordId,
        fields: &HashMap<String, Value>,
    ) -> Result<Record, SourceError>;

    fn create(&self, fields: &HashMap<String, Value>) -> Result<Record, SourceError>;

    fn remove(&self, id: RecordId) -> Result<(), SourceError>;
}
