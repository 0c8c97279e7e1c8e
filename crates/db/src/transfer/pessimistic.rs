//! Lock-based transfer.

use ledgerlock_core::transfer::{BalancePair, TransferPlan, TransferRequest};
use ledgerlock_shared::types::{AccountId, Isolation};
use rust_decimal::Decimal;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument, warn};

use crate::error::LedgerError;
use crate::gateway::StoreGateway;
use crate::repositories::AccountRepository;
use crate::unit_of_work::UnitOfWork;

/// Moves value between two accounts while holding row locks on both.
///
/// A second pessimistic transfer touching either account waits until this
/// one commits or rolls back. Under PostgreSQL serializable isolation the
/// waiter may then be aborted with a serialization failure, reported as
/// [`LedgerError::Serialization`] with both accounts unchanged.
#[derive(Debug, Clone)]
pub struct PessimisticTransfer {
    accounts: AccountRepository,
    isolation: Isolation,
}

impl PessimisticTransfer {
    /// Creates the operation with serializable isolation.
    #[must_use]
    pub fn new(gateway: StoreGateway) -> Self {
        Self {
            accounts: AccountRepository::new(gateway),
            isolation: Isolation::Serializable,
        }
    }

    /// Overrides the isolation of the transfer's unit of work.
    #[must_use]
    pub const fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Moves `amount` from `source` to `target` in a unit of work of its own.
    ///
    /// Returns the balances as written. No overdraft check is made.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the request is invalid (`Validation`)
    /// - either account is missing (`NotFound`)
    /// - the store aborted the unit of work (`Serialization`)
    /// - a read or write failed (`Store`)
    ///
    /// In every case nothing was written.
    pub async fn transfer(
        &self,
        source: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<BalancePair, LedgerError> {
        let request = TransferRequest::new(source, target, amount)?;
        self.transfer_in(None, &request).await
    }

    /// Moves the requested amount, joining `uow` when supplied.
    ///
    /// Inside a caller's unit of work the locks are held, and the writes
    /// stay uncommitted, until the caller settles it.
    ///
    /// # Errors
    ///
    /// Same as [`PessimisticTransfer::transfer`].
    #[instrument(
        skip(self, uow, request),
        fields(source = %request.source(), target = %request.target(), amount = %request.amount())
    )]
    pub async fn transfer_in(
        &self,
        uow: Option<&DatabaseTransaction>,
        request: &TransferRequest,
    ) -> Result<BalancePair, LedgerError> {
        let unit = UnitOfWork::enter(self.accounts.gateway(), uow, self.isolation).await?;
        let owned = unit.is_owned();
        let outcome = self.move_funds(unit.conn(), request).await;
        let outcome = unit.finish(outcome).await;

        match &outcome {
            Ok(after) if owned => info!(
                source_balance = %after.source,
                target_balance = %after.target,
                "Pessimistic transfer committed"
            ),
            Ok(_) => {}
            Err(err) if err.is_conflict() => {
                warn!(error = %err, "Pessimistic transfer aborted by store");
            }
            Err(err) => warn!(error = %err, "Pessimistic transfer failed"),
        }
        outcome
    }

    async fn move_funds(
        &self,
        txn: &DatabaseTransaction,
        request: &TransferRequest,
    ) -> Result<BalancePair, LedgerError> {
        // Ascending ID order: opposite-direction transfers over the same pair
        // queue on the first lock instead of deadlocking.
        let [first, second] = request.lock_order();
        let first_balance = self.accounts.lock_balance(txn, first).await?;
        let second_balance = self.accounts.lock_balance(txn, second).await?;
        let (source_balance, target_balance) = if first == request.source() {
            (first_balance, second_balance)
        } else {
            (second_balance, first_balance)
        };

        let plan = TransferPlan::compute(request, source_balance, target_balance)?;
        debug_assert!(plan.is_conserving());

        self.accounts
            .update_balance(Some(txn), request.source(), plan.after.source)
            .await?;
        self.accounts
            .update_balance(Some(txn), request.target(), plan.after.target)
            .await?;

        Ok(plan.after)
    }
}
