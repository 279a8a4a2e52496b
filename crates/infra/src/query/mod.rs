//! Single-row query boundary used by the GUID behavior.
//!
//! This module defines the storage-facing abstraction (a parameterized
//! "select one row where column = value" lookup) without making any storage
//! assumptions, plus in-memory and Postgres implementations.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryQueryExecutor;
pub use postgres::PostgresQueryExecutor;
pub use r#trait::{QueryExecutor, SelectOne};
