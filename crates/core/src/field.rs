//! Field descriptors: static column configuration for a grid.
//!
//! Descriptors are configuration, not derived from data. They drive which
//! cells are editable and how an edit commits (text on blur/Enter, select
//! immediately on change).

use serde::{Deserialize, Serialize};

/// How a field is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text; commits on blur or Enter.
    Text,
    /// Fixed option list; commits immediately on change.
    Select { options: Vec<String> },
}

/// Static configuration for one grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub editable: bool,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Editable free-text field.
    pub fn text(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            editable: true,
            kind: FieldKind::Text,
        }
    }

    /// Editable select field with a fixed option list.
    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            editable: true,
            kind: FieldKind::Select {
                options: options.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Display-only field.
    pub fn read_only(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            editable: false,
            kind: FieldKind::Text,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select { .. })
    }
}
