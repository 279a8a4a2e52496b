//! Record trait: the in-memory view of one table row that the GUID behavior
//! reads and mutates.

use serde_json::{Map, Value as JsonValue};

use crate::id::PrimaryKey;
use crate::row::Row;

/// Minimal record interface.
///
/// Attribute storage, dirty tracking and persistence stay with the owning
/// record layer; the GUID behavior only needs to read and write one string
/// field and to load a fetched row.
pub trait Record {
    /// Backing table.
    fn table_name(&self) -> &str;

    /// Primary key column name.
    fn primary_key_column(&self) -> &str {
        "id"
    }

    /// Primary key value, once storage has assigned one.
    fn primary_key(&self) -> Option<PrimaryKey>;

    /// String value of `column`, if set.
    fn get(&self, column: &str) -> Option<&str>;

    /// Does `column` hold a value that should not be replaced?
    ///
    /// Unset and empty-string columns are vacant. Records that can hold
    /// non-string values should override this so those count as present.
    fn has_value(&self, column: &str) -> bool {
        self.get(column).is_some_and(|value| !value.is_empty())
    }

    /// Set `column` in memory. Persisting it is the owner's job.
    fn set(&mut self, column: &str, value: String);

    /// Replace in-memory state with a fetched row.
    fn hydrate(&mut self, row: Row);
}

/// Map-backed [`Record`] for callers without a typed model.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    table: String,
    key_column: String,
    primary_key: Option<PrimaryKey>,
    values: Map<String, JsonValue>,
}

impl DynamicRecord {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key_column: "id".to_string(),
            primary_key: None,
            values: Map::new(),
        }
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    pub fn with_primary_key(mut self, key: impl Into<PrimaryKey>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Is there a loaded row behind this record?
    pub fn loaded(&self) -> bool {
        self.primary_key.is_some()
    }

    pub fn values(&self) -> &Map<String, JsonValue> {
        &self.values
    }

    /// Snapshot as a [`Row`], if a primary key has been assigned.
    pub fn to_row(&self) -> Option<Row> {
        self.primary_key.map(|primary_key| Row {
            primary_key,
            columns: self.values.clone(),
        })
    }
}

impl Record for DynamicRecord {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn primary_key_column(&self) -> &str {
        &self.key_column
    }

    fn primary_key(&self) -> Option<PrimaryKey> {
        self.primary_key
    }

    fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(JsonValue::as_str)
    }

    fn has_value(&self, column: &str) -> bool {
        match self.values.get(column) {
            None | Some(JsonValue::Null) => false,
            Some(JsonValue::String(value)) => !value.is_empty(),
            Some(_) => true,
        }
    }

    fn set(&mut self, column: &str, value: String) {
        self.values.insert(column.to_string(), JsonValue::String(value));
    }

    fn hydrate(&mut self, row: Row) {
        self.primary_key = Some(row.primary_key);
        self.values = row.columns;
    }
}
