//! Balance planning for a transfer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransferRuleError;
use super::request::TransferRequest;

/// Balances of the source and target accounts at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePair {
    /// Source account balance.
    pub source: Decimal,
    /// Target account balance.
    pub target: Decimal,
}

impl BalancePair {
    /// Creates a balance pair.
    #[must_use]
    pub const fn new(source: Decimal, target: Decimal) -> Self {
        Self { source, target }
    }

    /// Sum of both balances.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.source + self.target
    }
}

/// The before and after balances of a transfer.
///
/// No overdraft check is applied: a plan may leave the source negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Balances the plan was computed from.
    pub before: BalancePair,
    /// Balances to write.
    pub after: BalancePair,
}

impl TransferPlan {
    /// Computes `source - amount` and `target + amount`.
    ///
    /// # Errors
    ///
    /// Returns `BalanceOverflow` if either result leaves the decimal range.
    pub fn compute(
        request: &TransferRequest,
        source_balance: Decimal,
        target_balance: Decimal,
    ) -> Result<Self, TransferRuleError> {
        let new_source = source_balance
            .checked_sub(request.amount())
            .ok_or(TransferRuleError::BalanceOverflow(request.source()))?;
        let new_target = target_balance
            .checked_add(request.amount())
            .ok_or(TransferRuleError::BalanceOverflow(request.target()))?;

        Ok(Self {
            before: BalancePair::new(source_balance, target_balance),
            after: BalancePair::new(new_source, new_target),
        })
    }

    /// Whether the plan neither creates nor destroys value.
    #[must_use]
    pub fn is_conserving(&self) -> bool {
        self.before.total() == self.after.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlock_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> TransferRequest {
        TransferRequest::new(AccountId(1), AccountId(2), amount).unwrap()
    }

    #[test]
    fn test_compute_moves_amount() {
        let plan = TransferPlan::compute(&request(dec!(30)), dec!(100), dec!(50)).unwrap();
        assert_eq!(plan.after, BalancePair::new(dec!(70), dec!(80)));
        assert_eq!(plan.before, BalancePair::new(dec!(100), dec!(50)));
        assert!(plan.is_conserving());
    }

    #[test]
    fn test_compute_allows_overdraft() {
        let plan = TransferPlan::compute(&request(dec!(150)), dec!(100), dec!(0)).unwrap();
        assert_eq!(plan.after.source, dec!(-50));
        assert_eq!(plan.after.target, dec!(150));
    }

    #[test]
    fn test_compute_keeps_cents_exact() {
        let plan = TransferPlan::compute(&request(dec!(0.10)), dec!(0.30), dec!(0.20)).unwrap();
        assert_eq!(plan.after, BalancePair::new(dec!(0.20), dec!(0.30)));
    }

    #[test]
    fn test_compute_overflow() {
        let plan = TransferPlan::compute(&request(dec!(1)), dec!(0), Decimal::MAX);
        assert_eq!(plan, Err(TransferRuleError::BalanceOverflow(AccountId(2))));

        let plan = TransferPlan::compute(&request(dec!(1)), Decimal::MIN, dec!(0));
        assert_eq!(plan, Err(TransferRuleError::BalanceOverflow(AccountId(1))));
    }
}
