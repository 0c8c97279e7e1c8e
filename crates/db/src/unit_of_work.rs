//! Transaction boundary management.
//!
//! Every repository method and both transfer strategies go through
//! [`UnitOfWork`]. A call either participates in a unit of work its caller
//! already opened ([`UnitOfWork::Borrowed`]) or opens its own
//! ([`UnitOfWork::Owned`]). Only the opener decides the outcome:
//!
//! | State    | `Ok` outcome         | `Err` outcome                  |
//! |----------|----------------------|--------------------------------|
//! | Owned    | commit, release      | rollback, release, return err  |
//! | Borrowed | nothing              | nothing, return err            |
//!
//! # Usage
//!
//! ```ignore
//! let unit = UnitOfWork::enter(&gateway, caller_txn, Isolation::Serializable).await?;
//! let outcome = do_work(unit.conn()).await;
//! unit.finish(outcome).await
//! ```
//!
//! Dropping an `Owned` unit without calling `finish` (for example when the
//! surrounding future is cancelled) rolls the transaction back before its
//! connection is returned to the pool.

use ledgerlock_shared::types::Isolation;
use sea_orm::DatabaseTransaction;
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::gateway::StoreGateway;

/// A unit of work tagged with who owns its outcome.
#[derive(Debug)]
pub enum UnitOfWork<'a> {
    /// Opened by this call; committed or rolled back by [`UnitOfWork::finish`].
    Owned(DatabaseTransaction),
    /// Supplied by the caller; never committed or rolled back here.
    Borrowed(&'a DatabaseTransaction),
}

impl<'a> UnitOfWork<'a> {
    /// Joins `supplied` if present, otherwise opens a new unit of work at
    /// `isolation`.
    ///
    /// # Errors
    ///
    /// Returns an error if a new unit of work cannot be opened.
    pub async fn enter(
        gateway: &StoreGateway,
        supplied: Option<&'a DatabaseTransaction>,
        isolation: Isolation,
    ) -> Result<Self, LedgerError> {
        match supplied {
            Some(txn) => Ok(Self::Borrowed(txn)),
            None => {
                let txn = gateway.open_unit_of_work(isolation).await?;
                Ok(Self::Owned(txn))
            }
        }
    }

    /// The transaction to run statements on.
    #[must_use]
    pub fn conn(&self) -> &DatabaseTransaction {
        match self {
            Self::Owned(txn) => txn,
            Self::Borrowed(txn) => txn,
        }
    }

    /// Whether this call opened the unit of work.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Settles the unit of work according to `outcome` and passes the
    /// outcome through.
    ///
    /// A failed commit is reported as the error. A failed rollback is logged
    /// and the originating error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error in `outcome`, or the commit error.
    pub async fn finish<T>(self, outcome: Result<T, LedgerError>) -> Result<T, LedgerError> {
        match (self, outcome) {
            (Self::Borrowed(_), outcome) => outcome,
            (Self::Owned(txn), Ok(value)) => {
                txn.commit().await?;
                debug!("Unit of work committed");
                Ok(value)
            }
            (Self::Owned(txn), Err(err)) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, cause = %err, "Rollback failed");
                } else {
                    debug!(cause = %err, "Unit of work rolled back");
                }
                Err(err)
            }
        }
    }
}
