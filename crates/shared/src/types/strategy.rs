//! Concurrency-control choices: which transfer strategy to run and which
//! isolation level a unit of work requests.

use serde::{Deserialize, Serialize};

/// Isolation level requested when a unit of work is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Full serializability. The default for every self-owned unit of work.
    #[default]
    Serializable,
    /// Snapshot taken at the first statement.
    RepeatableRead,
    /// Each statement sees the latest committed rows.
    ReadCommitted,
    /// Dirty reads permitted (where the store supports it).
    ReadUncommitted,
}

impl std::fmt::Display for Isolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serializable => write!(f, "serializable"),
            Self::RepeatableRead => write!(f, "repeatable_read"),
            Self::ReadCommitted => write!(f, "read_committed"),
            Self::ReadUncommitted => write!(f, "read_uncommitted"),
        }
    }
}

impl std::str::FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "serializable" => Ok(Self::Serializable),
            "repeatable_read" => Ok(Self::RepeatableRead),
            "read_committed" => Ok(Self::ReadCommitted),
            "read_uncommitted" => Ok(Self::ReadUncommitted),
            _ => Err(format!("Unknown isolation level: {s}")),
        }
    }
}

/// Strategy used to protect a transfer against concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyStrategy {
    /// Lock both rows for the duration of the transfer.
    #[default]
    Pessimistic,
    /// Read without locks, then compare-and-swap on the version stamps.
    Optimistic,
}

impl std::fmt::Display for ConcurrencyStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pessimistic => write!(f, "pessimistic"),
            Self::Optimistic => write!(f, "optimistic"),
        }
    }
}

impl std::str::FromStr for ConcurrencyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pessimistic" | "lock" => Ok(Self::Pessimistic),
            "optimistic" | "version" => Ok(Self::Optimistic),
            _ => Err(format!("Unknown concurrency strategy: {s}")),
        }
    }
}
