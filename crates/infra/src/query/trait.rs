use serde::{Deserialize, Serialize};
use std::sync::Arc;

use rowguid_core::{Row, StorageError};

/// "Select one row from `table` where `filter_column` = `value`, limit 1."
///
/// `value` is always bound as a parameter, never spliced into SQL text.
/// `key_column` tells the executor which column to report as the row's
/// primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOne {
    pub table: String,
    pub key_column: String,
    pub filter_column: String,
    pub value: String,
}

impl SelectOne {
    pub fn new(
        table: impl Into<String>,
        key_column: impl Into<String>,
        filter_column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key_column: key_column.into(),
            filter_column: filter_column.into(),
            value: value.into(),
        }
    }

    /// Same statement, new bound value.
    pub fn bind(&mut self, value: impl Into<String>) -> &mut Self {
        self.value = value.into();
        self
    }
}

/// Parameterized single-row lookup against the backing store.
///
/// The GUID behavior issues one of these per generation attempt and one per
/// lookup by GUID. `Ok(None)` is the "not found" outcome; `Err` is reserved
/// for storage faults (connectivity, malformed statements), which callers
/// must propagate rather than retry.
///
/// Implementations are synchronous: a call blocks until the store answers.
pub trait QueryExecutor: Send + Sync {
    fn find_one(&self, query: &SelectOne) -> Result<Option<Row>, StorageError>;
}

impl<S> QueryExecutor for Arc<S>
where
    S: QueryExecutor + ?Sized,
{
    fn find_one(&self, query: &SelectOne) -> Result<Option<Row>, StorageError> {
        (**self).find_one(query)
    }
}

impl<S> QueryExecutor for &S
where
    S: QueryExecutor + ?Sized,
{
    fn find_one(&self, query: &SelectOne) -> Result<Option<Row>, StorageError> {
        (**self).find_one(query)
    }
}
