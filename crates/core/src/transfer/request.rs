//! Validated transfer requests.

use ledgerlock_shared::types::{AccountId, TransferAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransferRuleError;

/// A request to move `amount` from `source` to `target`.
///
/// Construction validates the request, so holding one means the rules that
/// need no store access already passed. Deserialization goes through the
/// same checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedRequest")]
pub struct TransferRequest {
    source: AccountId,
    target: AccountId,
    amount: Decimal,
}

#[derive(Deserialize)]
struct UncheckedRequest {
    source: AccountId,
    target: AccountId,
    amount: Decimal,
}

impl TryFrom<UncheckedRequest> for TransferRequest {
    type Error = TransferRuleError;

    fn try_from(raw: UncheckedRequest) -> Result<Self, Self::Error> {
        Self::new(raw.source, raw.target, raw.amount)
    }
}

impl TransferRequest {
    /// Validates and builds a transfer request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `source` and `target` are the same account
    /// - `amount` is zero or negative
    pub fn new(
        source: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<Self, TransferRuleError> {
        if source == target {
            return Err(TransferRuleError::SameAccount(source));
        }
        if amount <= Decimal::ZERO {
            return Err(TransferRuleError::NonPositiveAmount(amount));
        }
        Ok(Self {
            source,
            target,
            amount,
        })
    }

    /// Builds a request from an already-validated amount.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` and `target` are the same account.
    pub fn from_amount(
        source: AccountId,
        target: AccountId,
        amount: TransferAmount,
    ) -> Result<Self, TransferRuleError> {
        Self::new(source, target, amount.value())
    }

    /// Account debited by the transfer.
    #[must_use]
    pub const fn source(&self) -> AccountId {
        self.source
    }

    /// Account credited by the transfer.
    #[must_use]
    pub const fn target(&self) -> AccountId {
        self.target
    }

    /// Amount moved.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Both accounts in ascending ID order.
    ///
    /// Row locks taken in this order cannot deadlock against another
    /// transfer over the same pair.
    #[must_use]
    pub fn lock_order(&self) -> [AccountId; 2] {
        if self.source < self.target {
            [self.source, self.target]
        } else {
            [self.target, self.source]
        }
    }
}
