//! Record lifecycle callbacks, one trait per capability.
//!
//! The owning record layer calls these explicitly from its load and save
//! routines; a behavior implements only the capabilities it needs.

use crate::entity::Record;
use crate::id::PrimaryKey;
use crate::token::LookupToken;

/// Outcome of a construction callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Construction {
    /// Continue with normal key-based construction.
    Proceed,
    /// The callback already loaded the record; skip normal construction.
    /// `primary_key` is `None` when nothing matched.
    Loaded { primary_key: Option<PrimaryKey> },
}

impl Construction {
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Construction::Loaded { .. })
    }
}

/// Called when a record is constructed from a lookup token.
pub trait OnConstruct<R: Record> {
    type Error: core::fmt::Debug;

    fn on_construct(&self, record: &mut R, token: &LookupToken)
    -> Result<Construction, Self::Error>;
}

/// Called before a new record is inserted.
pub trait OnCreate<R: Record> {
    type Error: core::fmt::Debug;

    fn on_create(&self, record: &mut R) -> Result<(), Self::Error>;
}

/// Called before an existing record is updated.
pub trait OnUpdate<R: Record> {
    type Error: core::fmt::Debug;

    fn on_update(&self, record: &mut R) -> Result<(), Self::Error>;
}
