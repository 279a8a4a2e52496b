//! A single fetched storage row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::id::PrimaryKey;

/// One row as returned by a query executor.
///
/// The primary key is carried separately so callers never have to know the
/// key column's name to tell "found" from "not found".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub primary_key: PrimaryKey,
    pub columns: Map<String, JsonValue>,
}

impl Row {
    pub fn new(primary_key: impl Into<PrimaryKey>) -> Self {
        Self {
            primary_key: primary_key.into(),
            columns: Map::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.columns.get(column)
    }

    /// Column value as a string, if it is one.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(JsonValue::as_str)
    }
}
