//! Common types used across the application.

pub mod id;
pub mod money;
pub mod strategy;

pub use id::{AccountId, AccountIdParseError, VersionStamp};
pub use money::{AmountParseError, TransferAmount};
pub use strategy::{ConcurrencyStrategy, Isolation};
