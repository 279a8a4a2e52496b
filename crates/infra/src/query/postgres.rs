//! Postgres-backed query executor.
//!
//! Table and column names cannot be bound as parameters, so they are checked
//! against `[A-Za-z_][A-Za-z0-9_]*` and double-quoted before being placed in
//! SQL text. Tables may be schema-qualified (`app.users`); each part is
//! checked and quoted on its own. The filter value is always a bound `$1`.
//!
//! The GUID column is expected to be textual (`char(36)`, `varchar`, `text`).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError |
//! |------------|----------------------|--------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | Any other | `Query` |
//! | Io / Tls / PoolTimedOut / PoolClosed | N/A | `Connection` |
//! | ColumnDecode / Decode / ColumnNotFound | N/A | `Decode` |
//! | Other | N/A | `Query` |

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row as _};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::instrument;

use rowguid_core::config::is_sql_identifier;
use rowguid_core::{PrimaryKey, Row, StorageError};

use super::r#trait::{QueryExecutor, SelectOne};

/// Postgres-backed [`QueryExecutor`].
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`.
///
/// ## Blocking
///
/// `QueryExecutor` is synchronous. The sync entry point blocks the calling
/// worker with `block_in_place` and drives the query on the current tokio
/// runtime, which must be multi-threaded. From async code, prefer
/// [`PostgresQueryExecutor::find_one_async`].
#[derive(Debug, Clone)]
pub struct PostgresQueryExecutor {
    pool: Arc<PgPool>,
}

impl PostgresQueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(
        skip(self),
        fields(table = %query.table, column = %query.filter_column),
        err
    )]
    pub async fn find_one_async(&self, query: &SelectOne) -> Result<Option<Row>, StorageError> {
        let sql = select_one_sql(query)?;

        let row = sqlx::query(&sql)
            .bind(&query.value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let primary_key: i64 = row
            .try_get("__pk")
            .map_err(|e| map_sqlx_error("decode_primary_key", e))?;
        let columns: JsonValue = row
            .try_get("__row")
            .map_err(|e| map_sqlx_error("decode_row", e))?;

        match columns {
            JsonValue::Object(columns) => Ok(Some(Row {
                primary_key: PrimaryKey::new(primary_key),
                columns,
            })),
            other => Err(StorageError::Decode(format!(
                "expected a JSON object for row, got {other}"
            ))),
        }
    }

    /// Create the unique index that makes the final insert/update the arbiter
    /// of GUID uniqueness.
    #[instrument(skip(self), err)]
    pub async fn ensure_unique_index(&self, table: &str, column: &str) -> Result<(), StorageError> {
        let sql = unique_guid_index_sql(table, column)?;
        sqlx::query(&sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_unique_index", e))?;
        Ok(())
    }
}

impl QueryExecutor for PostgresQueryExecutor {
    fn find_one(&self, query: &SelectOne) -> Result<Option<Row>, StorageError> {
        let handle = Handle::try_current().map_err(|_| {
            StorageError::Runtime(
                "PostgresQueryExecutor requires a tokio runtime; call it from within one".to_string(),
            )
        })?;

        if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
            return Err(StorageError::Runtime(
                "PostgresQueryExecutor needs a multi-threaded tokio runtime to block on".to_string(),
            ));
        }

        tokio::task::block_in_place(|| handle.block_on(self.find_one_async(query)))
    }
}

/// Double-quote a checked identifier.
pub fn quote_ident(name: &str) -> Result<String, StorageError> {
    if !is_sql_identifier(name) {
        return Err(StorageError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}

/// Quote a table name, either `table` or `schema.table`.
pub fn quote_table(name: &str) -> Result<String, StorageError> {
    match name.split_once('.') {
        None => quote_ident(name),
        Some((schema, table)) => {
            if !is_sql_identifier(schema) || !is_sql_identifier(table) {
                return Err(StorageError::InvalidIdentifier(name.to_string()));
            }
            Ok(format!("\"{schema}\".\"{table}\""))
        }
    }
}

/// SQL for a [`SelectOne`]: key column as `__pk`, whole row as `__row` (jsonb).
pub fn select_one_sql(query: &SelectOne) -> Result<String, StorageError> {
    let table = quote_table(&query.table)?;
    let key = quote_ident(&query.key_column)?;
    let filter = quote_ident(&query.filter_column)?;

    Ok(format!(
        "SELECT t.{key}::bigint AS __pk, to_jsonb(t) AS __row FROM {table} AS t WHERE t.{filter} = $1 LIMIT 1"
    ))
}

/// `CREATE UNIQUE INDEX IF NOT EXISTS` on the GUID column.
///
/// Index names cannot be schema-qualified; Postgres puts the index in the
/// table's schema, so only the bare table name goes into it.
pub fn unique_guid_index_sql(table: &str, column: &str) -> Result<String, StorageError> {
    let bare = table.rsplit_once('.').map_or(table, |(_, name)| name);
    let index = quote_ident(&format!("{bare}_{column}_unique"))?;
    let table = quote_table(table)?;
    let column = quote_ident(column)?;
    Ok(format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON {table} ({column})"
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            database_error(db_err.code().as_deref(), msg)
        }
        sqlx::Error::Io(e) => StorageError::Connection(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StorageError::Connection(format!("tls error in {operation}: {e}")),
        sqlx::Error::PoolTimedOut => {
            StorageError::Connection(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StorageError::Connection(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::ColumnNotFound(column) => {
            StorageError::Decode(format!("column {column} missing in {operation}"))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StorageError::Decode(format!("column {index} in {operation}: {source}"))
        }
        sqlx::Error::Decode(e) => StorageError::Decode(format!("{operation}: {e}")),
        other => StorageError::Query(format!("sqlx error in {operation}: {other}")),
    }
}

/// Classify a server-reported error by its SQLSTATE.
fn database_error(code: Option<&str>, msg: String) -> StorageError {
    match code {
        Some("23505") => StorageError::UniqueViolation(msg),
        _ => StorageError::Query(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;
    use tokio::runtime::{Builder, Runtime};

    // Nothing listens on port 1.
    const UNREACHABLE: &str = "postgres://rowguid@127.0.0.1:1/rowguid";

    fn lazy_executor(rt: &Runtime) -> PostgresQueryExecutor {
        let pool = rt
            .block_on(async {
                PgPoolOptions::new()
                    .acquire_timeout(Duration::from_millis(500))
                    .connect_lazy(UNREACHABLE)
            })
            .unwrap();
        PostgresQueryExecutor::new(pool)
    }

    fn lookup() -> SelectOne {
        SelectOne::new("users", "id", "guid", "550e8400-e29b-41d4-a716-446655440000")
    }

    #[test]
    fn select_sql_quotes_identifiers_and_binds_the_value() {
        let query = SelectOne::new("users", "id", "guid", "x'; drop table users; --");
        let sql = select_one_sql(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT t.\"id\"::bigint AS __pk, to_jsonb(t) AS __row FROM \"users\" AS t WHERE t.\"guid\" = $1 LIMIT 1"
        );
        assert!(!sql.contains("drop"));
    }

    #[test]
    fn unsafe_identifiers_are_rejected() {
        let query = SelectOne::new("users\"; --", "id", "guid", "v");
        assert!(matches!(
            select_one_sql(&query),
            Err(StorageError::InvalidIdentifier(_))
        ));
        assert!(unique_guid_index_sql("users", "gu id").is_err());
    }

    #[test]
    fn unique_index_sql() {
        assert_eq!(
            unique_guid_index_sql("users", "guid").unwrap(),
            "CREATE UNIQUE INDEX IF NOT EXISTS \"users_guid_unique\" ON \"users\" (\"guid\")"
        );
        assert_eq!(
            unique_guid_index_sql("app.users", "guid").unwrap(),
            "CREATE UNIQUE INDEX IF NOT EXISTS \"users_guid_unique\" ON \"app\".\"users\" (\"guid\")"
        );
    }

    #[test]
    fn schema_qualified_tables_quote_each_part() {
        assert_eq!(quote_table("app.users").unwrap(), "\"app\".\"users\"");
        assert_eq!(quote_table("users").unwrap(), "\"users\"");

        let sql = select_one_sql(&SelectOne::new("app.users", "id", "guid", "v")).unwrap();
        assert!(sql.contains("FROM \"app\".\"users\" AS t"));

        for bad in ["app.", ".users", "a..b", "a.b.c", "app.us ers"] {
            assert!(
                matches!(quote_table(bad), Err(StorageError::InvalidIdentifier(_))),
                "{bad}"
            );
        }
        // Column names stay single identifiers.
        assert!(quote_ident("app.guid").is_err());
    }

    #[test]
    fn connection_failures_map_to_connection() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        for err in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::Io(refused),
        ] {
            let mapped = map_sqlx_error("find_one", err);
            assert!(matches!(mapped, StorageError::Connection(_)), "{mapped:?}");
        }
        assert_eq!(
            map_sqlx_error("find_one", sqlx::Error::PoolTimedOut),
            StorageError::Connection("connection pool timed out in find_one".to_string())
        );
    }

    #[test]
    fn decode_and_other_failures_are_classified() {
        assert!(matches!(
            map_sqlx_error("decode_row", sqlx::Error::ColumnNotFound("__row".into())),
            StorageError::Decode(_)
        ));
        assert!(matches!(
            map_sqlx_error("find_one", sqlx::Error::Protocol("unexpected message".into())),
            StorageError::Query(_)
        ));
    }

    #[test]
    fn unique_violation_is_recognized_by_sqlstate() {
        assert_eq!(
            database_error(Some("23505"), "dup".to_string()),
            StorageError::UniqueViolation("dup".to_string())
        );
        assert_eq!(
            database_error(Some("42P01"), "missing".to_string()),
            StorageError::Query("missing".to_string())
        );
        assert_eq!(
            database_error(None, "unknown".to_string()),
            StorageError::Query("unknown".to_string())
        );
    }

    #[test]
    fn find_one_outside_a_runtime_is_a_runtime_error() {
        let rt = Builder::new_multi_thread().enable_all().build().unwrap();
        let executor = lazy_executor(&rt);

        let err = executor.find_one(&lookup()).unwrap_err();

        assert!(matches!(err, StorageError::Runtime(_)), "{err:?}");
    }

    #[test]
    fn find_one_on_a_current_thread_runtime_is_a_runtime_error() {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        let executor = lazy_executor(&rt);

        let err = rt
            .block_on(async { executor.find_one(&lookup()) })
            .unwrap_err();

        assert!(matches!(err, StorageError::Runtime(_)), "{err:?}");
    }

    #[test]
    fn unreachable_server_is_a_connection_error() {
        let rt = Builder::new_multi_thread().enable_all().build().unwrap();
        let executor = lazy_executor(&rt);

        let result = rt
            .block_on(async move {
                tokio::task::spawn_blocking(move || executor.find_one(&lookup())).await
            })
            .unwrap();

        assert!(
            matches!(result, Err(StorageError::Connection(_))),
            "{result:?}"
        );
    }
}
