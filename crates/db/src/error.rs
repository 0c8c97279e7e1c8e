//! Ledger error kinds surfaced by the repository and both transfer strategies.

use ledgerlock_core::transfer::TransferRuleError;
use ledgerlock_shared::AppError;
use ledgerlock_shared::types::{AccountId, VersionStamp};
use sea_orm::{DbErr, RuntimeErr};

/// SQLSTATE codes (PostgreSQL) and extended result codes (SQLite) meaning the
/// store aborted the transaction to keep it serializable.
const SERIALIZATION_CODES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "5",     // SQLITE_BUSY
    "6",     // SQLITE_LOCKED
    "262",   // SQLITE_LOCKED_SHAREDCACHE
    "517",   // SQLITE_BUSY_SNAPSHOT
];

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Referenced account does not exist.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Optimistic version check failed: another writer changed the account
    /// after it was read.
    #[error("Version conflict on account {account_id}: expected version {expected}")]
    Conflict {
        /// Account whose version moved.
        account_id: AccountId,
        /// Version captured at read time.
        expected: VersionStamp,
    },

    /// The store aborted the unit of work to preserve serializability.
    #[error("Serialization failure, transaction rolled back: {0}")]
    Serialization(String),

    /// Malformed request rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying read or write failed for infrastructure reasons.
    #[error("Database error: {0}")]
    Store(DbErr),
}

impl LedgerError {
    /// Whether the failed call is known to have changed nothing, so the
    /// caller may re-read and retry.
    ///
    /// `Store` errors are excluded: a lost connection during commit leaves
    /// the outcome unknown.
    #[must_use]
    pub const fn is_retry_safe(&self) -> bool {
        !matches!(self, Self::Store(_))
    }

    /// Whether this is an optimistic or store-detected conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Serialization(_))
    }
}

/// Extracts the driver error code carried by a `DbErr`, if any.
fn error_code(err: &DbErr) -> Option<String> {
    let (DbErr::Conn(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))) = err
    else {
        return None;
    };

    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .map(std::borrow::Cow::into_owned)
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        match error_code(&err) {
            Some(code) if SERIALIZATION_CODES.contains(&code.as_str()) => {
                Self::Serialization(err.to_string())
            }
            _ => Self::Store(err),
        }
    }
}

impl From<TransferRuleError> for LedgerError {
    fn from(err: TransferRuleError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Conflict { .. } | LedgerError::Serialization(_) => {
                Self::Conflict(err.to_string())
            }
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::Store(db_err) => Self::Database(db_err.to_string()),
        }
    }
}
