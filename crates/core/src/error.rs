//! Error model for GUID assignment and lookup.

use thiserror::Error;

/// Result type used across the GUID layer.
pub type GuidResult<T> = Result<T, GuidError>;

/// GUID-level error.
///
/// A duplicate candidate found during assignment is not an error: it is
/// recovered locally by generating another candidate. Everything here is
/// surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuidError {
    /// The secure random source failed to produce bytes.
    #[error("secure random source failed: {0}")]
    RandomnessExhausted(String),

    /// The collision retry cap was reached without finding a free candidate.
    #[error("no unique GUID found for table '{table}' after {attempts} attempts")]
    RetryExhausted { table: String, attempts: u32 },

    /// The query executor failed. Never retried at this layer.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Behavior configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A value could not be parsed as a canonical GUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl GuidError {
    pub fn randomness(msg: impl Into<String>) -> Self {
        Self::RandomnessExhausted(msg.into())
    }

    pub fn retry_exhausted(table: impl Into<String>, attempts: u32) -> Self {
        Self::RetryExhausted {
            table: table.into(),
            attempts,
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Failure reported by a query executor.
///
/// These are infrastructure errors (connectivity, malformed statements) as
/// opposed to the logical "row already exists" outcome of an existence check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("connection failure: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    /// A unique constraint rejected a write (lost check-then-write race).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A table or column name is not a safe SQL identifier.
    #[error("invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("failed to decode row: {0}")]
    Decode(String),

    /// The executor could not reach an async runtime to block on.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_pass_through_unchanged() {
        let err: GuidError = StorageError::Connection("refused".into()).into();
        assert_eq!(err.to_string(), "connection failure: refused");
        assert!(matches!(err, GuidError::Storage(StorageError::Connection(_))));
    }

    #[test]
    fn retry_exhausted_names_table_and_attempts() {
        let err = GuidError::retry_exhausted("users", 3);
        assert_eq!(
            err.to_string(),
            "no unique GUID found for table 'users' after 3 attempts"
        );
    }
}
