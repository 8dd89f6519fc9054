//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a pantry item.
///
/// Opaque: the document store assigns it on creation and it never changes
/// afterwards. Only shape is checked (non-empty, no `/`), since it doubles as
/// a document path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PantryItemId(String);

impl PantryItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PantryItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PantryItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("PantryItemId: empty"));
        }
        if s.contains('/') {
            return Err(DomainError::invalid_id(format!(
                "PantryItemId: '{s}' contains a path separator"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for PantryItemId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PantryItemId> for String {
    fn from(value: PantryItemId) -> Self {
        value.0
    }
}
