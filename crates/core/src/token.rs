//! Lookup tokens: the value a caller hands over when constructing a record.

use serde::{Deserialize, Serialize};

use crate::generator::is_valid_format;
use crate::id::Guid;

/// Raw lookup value supplied when instantiating or loading a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupToken {
    /// Nothing supplied: a fresh record.
    #[default]
    Absent,
    /// Bulk-load hint (several keys). Not resolved by the GUID behavior.
    Collection(Vec<String>),
    /// A single key, either a numeric primary key or a GUID.
    Text(String),
}

/// What a [`LookupToken`] looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Absent,
    Collection,
    /// Decimal digits only; left to key-based loading.
    PrimaryKey(String),
    /// Non-numeric and in canonical GUID form. Holds the token as supplied,
    /// case included.
    Guid(String),
    /// Non-numeric but not a GUID (includes the empty string).
    Unrecognized(String),
}

impl LookupToken {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn classify(&self) -> TokenKind {
        match self {
            LookupToken::Absent => TokenKind::Absent,
            LookupToken::Collection(_) => TokenKind::Collection,
            LookupToken::Text(s) if is_digits(s) => TokenKind::PrimaryKey(s.clone()),
            LookupToken::Text(s) if is_valid_format(s) => TokenKind::Guid(s.clone()),
            LookupToken::Text(s) => TokenKind::Unrecognized(s.clone()),
        }
    }
}

impl From<&str> for LookupToken {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LookupToken {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for LookupToken {
    fn from(value: i64) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Guid> for LookupToken {
    fn from(value: Guid) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<LookupToken>> From<Option<T>> for LookupToken {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
