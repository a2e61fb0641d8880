//! Pagination slicer: fixed-size row windows over a display list.
//!
//! Only rows count toward the page window. A group header is included on a
//! page iff at least one of its rows lands on that page; when the window
//! starts mid-group, the group's header is re-emitted before its first
//! included row so no page ever shows orphaned rows.

use trellis_core::DisplayItem;

/// Slice `items` to the rows of page `page_index` (0-based), carrying group
/// headers across page boundaries. A page index past the end yields an
/// empty slice.
pub fn paginate(items: &[DisplayItem], page_size: usize, page_index: usize) -> Vec<DisplayItem> {
    if page_size == 0 {
        return Vec::new();
    }
    let window_start = page_index.saturating_mul(page_size);
    let window_end = window_start.saturating_add(page_size);

    let mut out = Vec::new();
    let mut current_header: Option<&DisplayItem> = None;
    let mut header_emitted = false;
    let mut row_index = 0usize;

    for item in items {
        match item {
            DisplayItem::Header { .. } => {
                current_header = Some(item);
                header_emitted = false;
            }
            DisplayItem::Row { .. } => {
                if row_index >= window_start && row_index < window_end {
                    if let Some(header) = current_header {
                        if !header_emitted {
                            out.push(header.clone());
                            header_emitted = true;
                        }
                    }
                    out.push(item.clone());
                }
                row_index += 1;
                if row_index >= window_end {
                    break;
                }
            }
        }
    }
    out
}
