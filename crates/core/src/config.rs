//! GUID behavior configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GuidError, GuidResult};

pub const DEFAULT_COLUMN: &str = "guid";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 256;

/// Options for the GUID behavior.
///
/// Missing keys fall back to the defaults, so this can be embedded in a larger
/// config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidConfig {
    /// Column holding the identifier. Default `"guid"`.
    pub column: String,
    /// Whether lookup by GUID is the only non-numeric construction path.
    /// Default `true`. Carried for callers; the behavior itself does not
    /// branch on it.
    pub guid_only: bool,
    /// Collision checks allowed per assignment before giving up. Default 256.
    pub max_attempts: u32,
}

impl Default for GuidConfig {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            guid_only: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GuidConfig {
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_guid_only(mut self, guid_only: bool) -> Self {
        self.guid_only = guid_only;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Defaults overridden by `ROWGUID_COLUMN`, `ROWGUID_GUID_ONLY` and
    /// `ROWGUID_MAX_ATTEMPTS`. The result is validated.
    pub fn from_env() -> GuidResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GuidResult<Self> {
        let mut config = Self::default();

        if let Some(column) = lookup("ROWGUID_COLUMN") {
            config.column = column;
        }
        if let Some(raw) = lookup("ROWGUID_GUID_ONLY") {
            config.guid_only = parse_bool(&raw).ok_or_else(|| {
                GuidError::invalid_config(format!("ROWGUID_GUID_ONLY: not a boolean: {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup("ROWGUID_MAX_ATTEMPTS") {
            config.max_attempts = raw.trim().parse().map_err(|e| {
                GuidError::invalid_config(format!("ROWGUID_MAX_ATTEMPTS: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GuidResult<()> {
        if !is_sql_identifier(&self.column) {
            return Err(GuidError::invalid_config(format!(
                "column must be a plain SQL identifier, got {:?}",
                self.column
            )));
        }
        if self.max_attempts == 0 {
            return Err(GuidError::invalid_config("max_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
