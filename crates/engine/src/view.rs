//! View pipeline: search, filter, sort, group.
//!
//! `project` is the one pure function that turns the canonical record list
//! into the ordered display list the grid renders. Key invariants:
//! - Deterministic: identical inputs produce identical output.
//! - Stable sort: equal keys preserve canonical record order.
//! - Grouped output covers exactly the filtered/sorted set, no duplicates.
//! - Filters OR within a dimension and AND across dimensions; an empty
//!   filter set for a dimension means no restriction.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use trellis_core::{DisplayItem, FieldDescriptor, Record, Value, ValueKey};

// =============================================================================
// Options and configuration
// =============================================================================

/// Sort comparator selection. All comparators are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// By `name`, ascending; normalized (trim + lowercase) string compare.
    NameAsc,
    /// By `name`, descending.
    NameDesc,
    /// By a numeric field, descending. Records without the field sort last.
    NumericDesc(String),
    /// By best-available timestamp, descending: `updated_at`, falling back
    /// to `created_at`, falling back to the empty string. ISO-8601 strings
    /// compare correctly as plain strings.
    Recent,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::NameAsc
    }
}

/// User-controlled view state: what to search, filter, sort, and group by.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub search: String,
    /// Per-field allowed value sets. OR within a field, AND across fields.
    pub filters: FxHashMap<String, FxHashSet<ValueKey>>,
    pub sort: SortOrder,
    /// Group field, or `None` for a flat list.
    pub group_by: Option<String>,
}

impl ViewOptions {
    /// Replace the filter set for one dimension. An empty set clears it.
    pub fn set_filter(&mut self, field: &str, allowed: FxHashSet<ValueKey>) {
        if allowed.is_empty() {
            self.filters.remove(field);
        } else {
            self.filters.insert(field.to_string(), allowed);
        }
    }
}

/// Static grid configuration: column descriptors, the search whitelist, and
/// the fixed group-bucket priority order.
#[derive(Debug, Clone, Default)]
pub struct ViewConfig {
    pub fields: Vec<FieldDescriptor>,
    /// Fields searched by the free-text query (ANY-match).
    pub searchable: Vec<String>,
    /// Group labels pinned to the front of the bucket order, in this order.
    /// Remaining buckets follow alphabetically.
    pub group_priority: Vec<String>,
}

impl ViewConfig {
    pub fn descriptor(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Sentinel label for records missing the group field.
    fn missing_label(&self, group_field: &str) -> String {
        match self.descriptor(group_field) {
            Some(desc) => format!("No {}", desc.label),
            None => "Unknown".to_string(),
        }
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Project records through search → filter → sort → group into display items.
pub fn project(records: &[Record], opts: &ViewOptions, config: &ViewConfig) -> Vec<DisplayItem> {
    let mut visible: Vec<&Record> = records
        .iter()
        .filter(|r| matches_search(r, &opts.search, &config.searchable))
        .filter(|r| matches_filters(r, &opts.filters))
        .collect();

    // Stable: ties keep canonical record order.
    visible.sort_by(|a, b| compare(a, b, &opts.sort));

    match &opts.group_by {
        None => visible
            .iter()
            .map(|r| DisplayItem::Row { id: r.id })
            .collect(),
        Some(field) => group_items(&visible, field, config),
    }
}

fn matches_search(record: &Record, query: &str, searchable: &[String]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    searchable
        .iter()
        .any(|field| record.get(field).normalized_text().contains(&needle))
}

fn matches_filters(record: &Record, filters: &FxHashMap<String, FxHashSet<ValueKey>>) -> bool {
    filters.iter().all(|(field, allowed)| {
        allowed.is_empty() || allowed.contains(&record.get(field).key())
    })
}

fn compare(a: &Record, b: &Record, sort: &SortOrder) -> Ordering {
    match sort {
        SortOrder::NameAsc => name_of(a).cmp(&name_of(b)),
        SortOrder::NameDesc => name_of(b).cmp(&name_of(a)),
        SortOrder::NumericDesc(field) => {
            let av = a.number(field).unwrap_or(f64::NEG_INFINITY);
            let bv = b.number(field).unwrap_or(f64::NEG_INFINITY);
            bv.partial_cmp(&av).unwrap_or(Ordering::Equal)
        }
        SortOrder::Recent => timestamp_of(b).cmp(&timestamp_of(a)),
    }
}

fn name_of(record: &Record) -> String {
    record.get("name").normalized_text()
}

fn timestamp_of(record: &Record) -> &str {
    record
        .text("updated_at")
        .or_else(|| record.text("created_at"))
        .unwrap_or("")
}

fn group_items(sorted: &[&Record], field: &str, config: &ViewConfig) -> Vec<DisplayItem> {
    let missing = config.missing_label(field);

    // Bucket in sorted order so rows inside a bucket stay sorted.
    let mut buckets: FxHashMap<String, Vec<&Record>> = FxHashMap::default();
    let mut seen: Vec<String> = Vec::new();
    for record in sorted {
        let label = match record.get(field) {
            Value::Null => missing.clone(),
            v => {
                let text = v.display_text();
                if text.trim().is_empty() {
                    missing.clone()
                } else {
                    text
                }
            }
        };
        if !buckets.contains_key(&label) {
            seen.push(label.clone());
        }
        buckets.entry(label).or_default().push(record);
    }

    // Priority labels first (in configured order), then the rest
    // alphabetically. Empty buckets are omitted by construction.
    let mut ordered: Vec<String> = Vec::new();
    for label in &config.group_priority {
        if buckets.contains_key(label) {
            ordered.push(label.clone());
        }
    }
    let mut rest: Vec<String> = seen
        .into_iter()
        .filter(|l| !config.group_priority.contains(l))
        .collect();
    rest.sort_by_key(|l| l.to_lowercase());
    ordered.extend(rest);

    let mut items = Vec::new();
    for label in ordered {
        let rows = &buckets[&label];
        items.push(DisplayItem::Header {
            label: label.clone(),
            count: rows.len(),
        });
        items.extend(rows.iter().map(|r| DisplayItem::Row { id: r.id }));
    }
    items
}

// =============================================================================
// Tests
// =============================================================================
