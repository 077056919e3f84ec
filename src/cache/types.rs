use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::RECORD_NAME_FIELD;

/// A stored document: a `name` field plus arbitrary payload fields
pub type Record = serde_json::Map<String, Value>;

/// On-disk layout of a store file: an object of tables, each an array of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreDocument {
    tables: BTreeMap<String, Vec<Record>>,
}

impl StoreDocument {
    /// Records of `table`, empty if the table was never written
    pub fn table(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Existing records of `table`, without creating it
    pub fn table_mut(&mut self, table: &str) -> Option<&mut Vec<Record>> {
        self.tables.get_mut(table)
    }

    /// Records of `table`, creating the table on first use
    pub fn table_entry(&mut self, table: &str) -> &mut Vec<Record> {
        self.tables.entry(table.to_string()).or_default()
    }

    pub fn drop_table(&mut self, table: &str) -> bool {
        self.tables.remove(table).is_some()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Build the record `{name, key: value}`
pub fn new_record(name: &str, key: &str, value: Value) -> Record {
    let mut record = Record::new();
    record.insert(RECORD_NAME_FIELD.to_string(), Value::String(name.to_string()));
    record.insert(key.to_string(), value);
    record
}

/// Whether `record` is the one called `name`
pub fn has_name(record: &Record, name: &str) -> bool {
    record.get(RECORD_NAME_FIELD).and_then(Value::as_str) == Some(name)
}
