//! Test fixtures: campaign-shaped records, a ready-made grid config, and a
//! scripted `RecordSource` mock with a call log.

use std::cell::RefCell;
use std::collections::HashMap;

use trellis_core::{FieldDescriptor, Record, RecordId, Value};

use crate::source::{RecordSource, SourceError};
use crate::view::ViewConfig;

/// A minimal campaign record: name + status.
pub fn campaign(id: i64, name: &str, status: &str) -> Record {
    Record::new(RecordId(id))
        .with("name", name)
        .with("status", status)
}

/// Grid configuration matching the campaigns table.
pub fn campaign_config() -> ViewConfig {
    ViewConfig {
        fields: vec![
            FieldDescriptor::text("name", "Name"),
            FieldDescriptor::text("description", "Description"),
            FieldDescriptor::select(
                "status",
                "Status",
                &["Active", "Paused", "Completed", "Draft"],
            ),
            FieldDescriptor::read_only("account_name", "Account"),
            FieldDescriptor::read_only("created_at", "Created"),
        ],
        searchable: vec![
            "name".to_string(),
            "description".to_string(),
            "account_name".to_string(),
        ],
        group_priority: vec![
            "Active".to_string(),
            "Paused".to_string(),
            "Completed".to_string(),
            "Draft".to_string(),
        ],
    }
}

/// One observed call on the scripted source.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Patch {
        id: RecordId,
        fields: HashMap<String, Value>,
    },
    Create,
    Remove(RecordId),
}

/// `RecordSource` mock: serves a fixed record set, fails the next N patch
/// calls when told to, and logs every call.
#[derive(Default)]
pub struct ScriptedSource {
    records: RefCell<Vec<Record>>,
    fail_next_patches: RefCell<usize>,
    fail_list: RefCell<bool>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn fail_next_patches(&self, count: usize) {
        *self.fail_next_patches.borrow_mut() = count;
    }

    pub fn fail_list(&self, fail: bool) {
        *self.fail_list.borrow_mut() = fail;
    }

    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.borrow_mut() = records;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn patch_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Patch { .. }))
            .count()
    }

    pub fn list_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::List))
            .count()
    }
}

impl RecordSource for ScriptedSource {
    fn list(&self) -> Result<Vec<Record>, SourceError> {
        self.calls.borrow_mut().push(Call::List);
        if *self.fail_list.borrow() {
            return Err(SourceError::new("list failed"));
        }
        Ok(self.records.borrow().clone())
    }

    fn patch(
        &self,
        id: RecordId,
        fields: &HashMap<String, Value>,
    ) -> Result<Record, SourceError> {
        self.calls.borrow_mut().push(Call::Patch {
            id,
            fields: fields.clone(),
        });
        let mut fail = self.fail_next_patches.borrow_mut();
        if *fail > 0 {
            *fail -= 1;
            return Err(SourceError::new("patch rejected"));
        }
        let mut records = self.records.borrow_mut();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.merge(fields);
                Ok(record.clone())
            }
            None => Err(SourceError::new(format!("no record {}", id))),
        }
    }

    fn create(&self, fields: &HashMap<String, Value>) -> Result<Record, SourceError> {
        self.calls.borrow_mut().push(Call::Create);
        let mut records = self.records.borrow_mut();
        let id = RecordId(records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1);
        let mut record = Record::new(id);
        record.merge(fields);
        records.push(record.clone());
        Ok(record)
    }

    fn remove(&self, id: RecordId) -> Result<(), SourceError> {
        self.calls.borrow_mut().push(Call::Remove(id));
        self.records.borrow_mut().retain(|r| r.id != id);
        Ok(())
    }
}
