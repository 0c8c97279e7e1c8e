//! Typed identifiers for ledger records.
//!
//! Using typed IDs prevents accidentally passing a version stamp where an
//! account ID is expected, or a raw integer where either is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an account, assigned by the store at creation.
///
/// IDs increase monotonically but are not guaranteed to be contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Creates an ID from a raw store value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw store value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when operator input is not a valid account ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid account ID '{0}': expected a positive integer")]
pub struct AccountIdParseError(pub String);

impl std::str::FromStr for AccountId {
    type Err = AccountIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(AccountIdParseError(s.to_string())),
        }
    }
}

/// Opaque conflict-detection token, regenerated on every mutating write.
///
/// Two reads of the same account observe the same stamp iff no write
/// committed between them. Stamps are random (UUID v4) and carry no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionStamp(pub Uuid);

impl VersionStamp {
    /// Generates a fresh, globally unique stamp.
    #[must_use]
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps a stamp read back from the store.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
