//! Display items: the tagged output of a view projection.

use crate::record::RecordId;

/// One item in the projected display list: either a group header or a row
/// referencing a record by id. Produced fresh on every projection, never
/// mutated, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    Header { label: String, count: usize },
    Row { id: RecordId },
}

impl DisplayItem {
    pub fn header(label: &str, count: usize) -> Self {
        DisplayItem::Header {
            label: label.to_string(),
            count,
        }
    }

    pub fn row(id: i64) -> Self {
        DisplayItem::Row { id: RecordId(id) }
    }

    pub fn is_row(&self) -> bool {
        matches!(self, DisplayItem::Row { .. })
    }

    pub fn row_id(&self) -> Option<RecordId> {
        match self {
            DisplayItem::Row { id } => Some(*id),
            DisplayItem::Header { .. } => None,
        }
    }
}

/// Flatten a display list into its row order (ids only, headers dropped).
pub fn row_order(items: &[DisplayItem]) -> Vec<RecordId> {
    items.iter().filter_map(DisplayItem::row_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_order_drops_headers() {
        let items = vec![
            DisplayItem::header("Active", 2),
            DisplayItem::row(1),
            DisplayItem::row(3),
            DisplayItem::header("Paused", 1),
            DisplayItem::row(2),
        ];
        assert_eq!(
            row_order(&items),
            vec![RecordId(1), RecordId(3), RecordId(2)]
        );
    }
}
