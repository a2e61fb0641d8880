//! Field values and their comparison keys.
//!
//! A `Value` is one of the four JSON scalars a record field can hold.
//! `ValueKey` is the normalized, hashable form used in filter sets: text is
//! trimmed + lowercased, numbers wrapped in `OrderedFloat` so keys are `Eq`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A scalar field value: string, number, boolean, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display string for search matching and group labels.
    pub fn display_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
        }
    }

    /// Normalized text form: trimmed + lowercased.
    pub fn normalized_text(&self) -> String {
        self.display_text().trim().to_lowercase()
    }

    /// Normalized key for filter-set membership.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            Value::Text(s) => ValueKey::Text(s.trim().to_lowercase()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Normalized key for comparison/hashing (used in filter `HashSet`s).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    /// Already normalized: trimmed + lowercased.
    Text(String),
}

impl ValueKey {
    /// Key for a raw text value (normalizes on the way in).
    pub fn text(s: &str) -> Self {
        ValueKey::Text(s.trim().to_lowercase())
    }

    pub fn number(n: f64) -> Self {
        ValueKey::Number(OrderedFloat(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_text() {
        let a = Value::Text("  Active  ".to_string());
        let b = Value::Text("active".to_string());
        let c = Value::Text("ACTIVE".to_string());

        assert_eq!(a.key(), b.key());
        assert_eq!(b.key(), c.key());
        assert_eq!(a.key(), ValueKey::text("Active"));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Value::Null.display_text(), "");
        assert_eq!(Value::Bool(true).display_text(), "true");
        assert_eq!(Value::Number(42.0).display_text(), "42");
        assert_eq!(Value::Number(1.5).display_text(), "1.5");
        assert_eq!(Value::Text("Q3 Launch".into()).display_text(), "Q3 Launch");
    }

    #[test]
    fn test_json_scalar_mapping() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        let v: Value = serde_json::from_str("3.5").unwrap();
        assert_eq!(v.as_number(), Some(3.5));
        let v: Value = serde_json::from_str("\"hi\"").unwrap();
        assert_eq!(v.as_str(), Some("hi"));
        let v: Value = serde_json::from_str("false").unwrap();
        assert_eq!(v, Value::Bool(false));

        assert_eq!(serde_json::to_string(&Value::Number(2.0)).unwrap(), "2.0");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }
}
