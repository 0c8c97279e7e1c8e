//! Version-checked transfer.

use ledgerlock_core::transfer::{TransferPlan, TransferRequest, TransferRuleError};
use ledgerlock_shared::types::{AccountId, Isolation};
use rust_decimal::Decimal;
use sea_orm::DatabaseTransaction;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::LedgerError;
use crate::gateway::StoreGateway;
use crate::repositories::{AccountRecord, AccountRepository};
use crate::unit_of_work::UnitOfWork;

/// Both account records as read at the start of an optimistic transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferSnapshot {
    /// Account to debit.
    pub source: AccountRecord,
    /// Account to credit.
    pub target: AccountRecord,
}

/// Moves value between two accounts without holding locks between read and
/// write.
///
/// The operation runs in two phases. [`OptimisticTransfer::read_snapshot`]
/// captures both records, each in a unit of work that commits at once.
/// [`OptimisticTransfer::apply`] then writes both balances in one unit of
/// work, each write guarded by the captured version. If either guard fails
/// the whole unit rolls back and the call returns `Conflict`. It never
/// retries.
#[derive(Debug, Clone)]
pub struct OptimisticTransfer {
    accounts: AccountRepository,
    isolation: Isolation,
}

impl OptimisticTransfer {
    /// Creates the operation with read-committed isolation for the write
    /// phase, so each version guard is checked against the latest committed
    /// row.
    #[must_use]
    pub fn new(gateway: StoreGateway) -> Self {
        Self {
            accounts: AccountRepository::new(gateway),
            isolation: Isolation::ReadCommitted,
        }
    }

    /// Overrides the isolation of the write phase.
    #[must_use]
    pub const fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Reads and applies in one call.
    ///
    /// Returns the amount moved.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the request is invalid (`Validation`)
    /// - either account is missing (`NotFound`)
    /// - either account changed after it was read (`Conflict`)
    /// - a read or write failed (`Store`)
    ///
    /// In every case nothing was written.
    pub async fn transfer(
        &self,
        source: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        TransferRequest::new(source, target, amount)?;
        let snapshot = self.read_snapshot(source, target).await?;
        self.apply(&snapshot, amount).await
    }

    /// Captures both records. No lock is retained after return.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if both IDs are the same account, `NotFound` if
    /// either is missing.
    #[instrument(skip(self))]
    pub async fn read_snapshot(
        &self,
        source: AccountId,
        target: AccountId,
    ) -> Result<TransferSnapshot, LedgerError> {
        if source == target {
            return Err(TransferRuleError::SameAccount(source).into());
        }
        let source = self.accounts.get_account(None, source).await?;
        let target = self.accounts.get_account(None, target).await?;
        Ok(TransferSnapshot { source, target })
    }

    /// Writes the balances computed from `snapshot`, provided neither account
    /// has changed since.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` naming the first account whose version moved. The
    /// source write, if it happened, is rolled back.
    #[instrument(skip(self, snapshot), fields(source = %snapshot.source.id, target = %snapshot.target.id))]
    pub async fn apply(
        &self,
        snapshot: &TransferSnapshot,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let request = TransferRequest::new(snapshot.source.id, snapshot.target.id, amount)?;
        let plan =
            TransferPlan::compute(&request, snapshot.source.balance, snapshot.target.balance)?;

        let unit = UnitOfWork::enter(self.accounts.gateway(), None, self.isolation).await?;
        let outcome = self.write_both(unit.conn(), snapshot, &plan).await;
        let outcome = unit.finish(outcome).await;

        match &outcome {
            Ok(()) => info!(
                %amount,
                source_balance = %plan.after.source,
                target_balance = %plan.after.target,
                "Optimistic transfer committed"
            ),
            Err(err) if err.is_conflict() => {
                warn!(error = %err, "Optimistic transfer lost a race");
            }
            Err(err) => warn!(error = %err, "Optimistic transfer failed"),
        }
        outcome.map(|()| amount)
    }

    /// Source first: a source conflict leaves the target unwritten.
    async fn write_both(
        &self,
        txn: &DatabaseTransaction,
        snapshot: &TransferSnapshot,
        plan: &TransferPlan,
    ) -> Result<(), LedgerError> {
        self.write_guarded(txn, snapshot.source, plan.after.source).await?;
        self.write_guarded(txn, snapshot.target, plan.after.target).await
    }

    async fn write_guarded(
        &self,
        txn: &DatabaseTransaction,
        record: AccountRecord,
        new_balance: Decimal,
    ) -> Result<(), LedgerError> {
        let written = self
            .accounts
            .update_balance_if_version_matches(Some(txn), record.id, new_balance, record.version)
            .await?;
        if written == 0 {
            return Err(LedgerError::Conflict {
                account_id: record.id,
                expected: record.version,
            });
        }
        Ok(())
    }
}
