//! Strongly-typed identifiers: the generated GUID and the storage primary key.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GuidError;
use crate::generator::is_valid_format;

/// Globally unique row identifier (random, version 4).
///
/// Serialized as its canonical 36-character dashed string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Guid {
    /// Build from 16 raw bytes. Version and variant bits are taken as given.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Version nibble (upper half of byte 6).
    pub fn version(&self) -> u8 {
        self.as_bytes()[6] >> 4
    }
}

impl core::fmt::Display for Guid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Lowercase 8-4-4-4-12.
        core::fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl From<Uuid> for Guid {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<Guid> for Uuid {
    fn from(value: Guid) -> Self {
        value.0
    }
}

impl FromStr for Guid {
    type Err = GuidError;

    /// Accepts only the canonical dashed form (either case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_format(s) {
            return Err(GuidError::invalid_id(format!("Guid: not canonical: {s:?}")));
        }
        let uuid = Uuid::parse_str(s).map_err(|e| GuidError::invalid_id(format!("Guid: {e}")))?;
        Ok(Self(uuid))
    }
}

impl Serialize for Guid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Storage-assigned numeric primary key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKey(i64);

impl PrimaryKey {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
