//! Transfer rule violations.

use ledgerlock_shared::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when a transfer request breaks a rule before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferRuleError {
    /// Source and target are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountId),

    /// Amount is zero or negative.
    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A resulting balance does not fit the decimal range.
    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountId),
}
