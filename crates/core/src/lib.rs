//! `rowguid-core` — GUID primitives for table-backed records.
//!
//! This crate contains **pure** building blocks (no storage access): identifier
//! generation and validation, lookup-token classification, the record
//! interface, configuration and lifecycle callback traits.

pub mod config;
pub mod entity;
pub mod error;
pub mod generator;
pub mod hooks;
pub mod id;
pub mod row;
pub mod token;

pub use config::GuidConfig;
pub use entity::{DynamicRecord, Record};
pub use error::{GuidError, GuidResult, StorageError};
pub use generator::{GuidGenerator, OsRandom, RandomSource, generate, is_valid_format};
pub use hooks::{Construction, OnConstruct, OnCreate, OnUpdate};
pub use id::{Guid, PrimaryKey};
pub use row::Row;
pub use token::{LookupToken, TokenKind};
