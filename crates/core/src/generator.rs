//! Random GUID generation and canonical-format validation.
//!
//! Generation knows nothing about storage; uniqueness against a table is the
//! guarded assigner's job.

use std::sync::LazyLock;

use rand::RngCore;
use rand::rngs::OsRng;
use regex_lite::Regex;

use crate::error::{GuidError, GuidResult};
use crate::id::Guid;

static CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("canonical GUID pattern is valid")
});

/// Returns `true` when `token` is exactly the 8-4-4-4-12 dashed hex shape.
///
/// Braced, URN and undashed forms are rejected.
pub fn is_valid_format(token: &str) -> bool {
    token.len() == 36 && CANONICAL.is_match(token)
}

/// Source of secure random bytes.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` completely or fail. Failures are fatal to the caller.
    fn fill(&self, buf: &mut [u8]) -> GuidResult<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Copy, Clone)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> GuidResult<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| GuidError::randomness(e.to_string()))
    }
}

/// Set the version-4 nibble (byte 6) and the RFC variant bits (byte 8),
/// leaving every other bit untouched.
pub fn stamp_v4(mut bytes: [u8; 16]) -> [u8; 16] {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    bytes
}

/// Produces version-4 GUIDs from a [`RandomSource`].
#[derive(Debug, Default, Clone)]
pub struct GuidGenerator<R = OsRandom> {
    source: R,
}

impl GuidGenerator<OsRandom> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: RandomSource> GuidGenerator<R> {
    pub fn with_source(source: R) -> Self {
        Self { source }
    }

    pub fn generate(&self) -> GuidResult<Guid> {
        let mut bytes = [0u8; 16];
        self.source.fill(&mut bytes)?;
        Ok(Guid::from_bytes(stamp_v4(bytes)))
    }
}

/// Generate a GUID from the operating system CSPRNG.
pub fn generate() -> GuidResult<Guid> {
    GuidGenerator::new().generate()
}
