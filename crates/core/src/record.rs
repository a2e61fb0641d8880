//! Records: schema-free field maps with a stable integer id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Stable, unique record identifier. Assigned by the backend, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entity instance (a campaign, a contract, a user) as a flat
/// field → value mapping. The engine never validates field semantics;
/// that is the backend's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: HashMap::new(),
        }
    }

    /// Builder-style field setter, for fixtures and tests.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Field value; `Value::Null` for absent fields.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&Value::Null)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_number)
    }

    /// Shallow merge of one field. Returns the previous value
    /// (`Value::Null` if the field was absent).
    pub fn set(&mut self, field: &str, value: Value) -> Value {
        self.fields
            .insert(field.to_string(), value)
            .unwrap_or(Value::Null)
    }

    /// Shallow merge of a field subset, e.g. a patched record's changes.
    pub fn merge(&mut self, fields: &HashMap<String, Value>) {
        for (k, v) in fields {
            self.fields.insert(k.clone(), v.clone());
        }
    }
}
