//! Transfer rules.
//!
//! This module implements the storage-agnostic half of a transfer:
//! - Request validation (distinct accounts, positive amount)
//! - Balance planning (debit source, credit target)
//! - The conservation check both strategies rely on

pub mod error;
pub mod plan;
pub mod request;

#[cfg(test)]
mod plan_props;

pub use error::TransferRuleError;
pub use plan::{BalancePair, TransferPlan};
pub use request::TransferRequest;
