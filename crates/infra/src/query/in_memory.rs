use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use rowguid_core::{Row, StorageError};

use super::r#trait::{QueryExecutor, SelectOne};

/// In-memory tables answering [`SelectOne`] lookups.
///
/// Intended for tests/dev. Not optimized for performance. Every lookup is
/// counted, and by default logged, so callers can assert on storage traffic.
#[derive(Debug)]
pub struct InMemoryQueryExecutor {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    queries: RwLock<Vec<SelectOne>>,
    log_queries: bool,
    calls: AtomicUsize,
}

impl Default for InMemoryQueryExecutor {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            queries: RwLock::default(),
            log_queries: true,
            calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts calls but keeps no query log (long-running benches).
    pub fn without_query_log() -> Self {
        Self {
            log_queries: false,
            ..Self::default()
        }
    }

    /// Append a row to `table`. Nothing is enforced (no unique constraints).
    pub fn insert(&self, table: impl Into<String>, row: Row) -> Result<(), StorageError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::Query("lock poisoned".to_string()))?;
        tables.entry(table.into()).or_default().push(row);
        Ok(())
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(table).cloned())
            .unwrap_or_default()
    }

    /// Number of `find_one` calls served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<SelectOne> {
        self.queries.read().map(|q| q.clone()).unwrap_or_default()
    }

    fn matches(row: &Row, query: &SelectOne) -> bool {
        if query.filter_column == query.key_column {
            return row.primary_key.to_string() == query.value;
        }
        row.get_str(&query.filter_column) == Some(query.value.as_str())
    }
}

impl QueryExecutor for InMemoryQueryExecutor {
    fn find_one(&self, query: &SelectOne) -> Result<Option<Row>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.log_queries {
            if let Ok(mut log) = self.queries.write() {
                log.push(query.clone());
            }
        }

        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::Query("lock poisoned".to_string()))?;

        Ok(tables
            .get(&query.table)
            .and_then(|rows| rows.iter().find(|row| Self::matches(row, query)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_by_column_within_table_only() {
        let store = InMemoryQueryExecutor::new();
        store.insert("users", Row::new(1).with("guid", "a")).unwrap();
        store.insert("posts", Row::new(2).with("guid", "b")).unwrap();

        let hit = store
            .find_one(&SelectOne::new("users", "id", "guid", "a"))
            .unwrap();
        assert_eq!(hit.map(|r| r.primary_key.get()), Some(1));

        let miss = store
            .find_one(&SelectOne::new("users", "id", "guid", "b"))
            .unwrap();
        assert!(miss.is_none());

        assert_eq!(store.calls(), 2);
        assert_eq!(store.queries()[1].value, "b");
    }

    #[test]
    fn unlogged_store_still_counts() {
        let store = InMemoryQueryExecutor::without_query_log();
        store
            .find_one(&SelectOne::new("users", "id", "guid", "a"))
            .unwrap();
        assert_eq!(store.calls(), 1);
        assert!(store.queries().is_empty());
    }

    #[test]
    fn filtering_on_the_key_column_compares_primary_keys() {
        let store = InMemoryQueryExecutor::new();
        store.insert("users", Row::new(42)).unwrap();
        let hit = store
            .find_one(&SelectOne::new("users", "id", "id", "42"))
            .unwrap();
        assert!(hit.is_some());
    }
}
