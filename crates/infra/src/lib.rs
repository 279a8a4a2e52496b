//! Infrastructure layer: query execution against the backing store and the
//! behaviors that need it.

pub mod behavior;
pub mod query;


pub use behavior::GuidBehavior;
pub use query::{InMemoryQueryExecutor, PostgresQueryExecutor, QueryExecutor, SelectOne};
