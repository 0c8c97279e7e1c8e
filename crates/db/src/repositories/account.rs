//! Account repository for balance and version-stamp operations.
//!
//! Every method takes `uow: Option<&DatabaseTransaction>`. With `None` the
//! repository opens, settles and releases its own unit of work; with `Some`
//! it runs inside the caller's and leaves commit or rollback to the caller.

use ledgerlock_shared::types::{AccountId, Isolation, VersionStamp};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::entities::{ExactDecimal, accounts};
use crate::error::LedgerError;
use crate::gateway::StoreGateway;
use crate::unit_of_work::UnitOfWork;

/// A full account record as read from the store.
///
/// This is a transient copy: it says nothing about the stored record once
/// the unit of work that read it has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    /// Account ID.
    pub id: AccountId,
    /// Balance at read time.
    pub balance: Decimal,
    /// Version stamp at read time.
    pub version: VersionStamp,
}

impl From<accounts::Model> for AccountRecord {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId(model.id),
            balance: model.balance.value(),
            version: VersionStamp::from_uuid(model.version),
        }
    }
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    gateway: StoreGateway,
    isolation: Isolation,
}

impl AccountRepository {
    /// Creates a repository whose self-owned units of work are serializable.
    #[must_use]
    pub fn new(gateway: StoreGateway) -> Self {
        Self {
            gateway,
            isolation: Isolation::default(),
        }
    }

    /// Overrides the isolation of self-owned units of work.
    #[must_use]
    pub const fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// The gateway this repository runs on.
    #[must_use]
    pub const fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    /// Inserts a new account with `initial_balance` and a fresh version.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the insert fails.
    #[instrument(skip(self, uow))]
    pub async fn create(
        &self,
        uow: Option<&DatabaseTransaction>,
        initial_balance: Decimal,
    ) -> Result<AccountId, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = insert_account(unit.conn(), initial_balance).await;
        unit.finish(outcome).await
    }

    /// Reads the balance of `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such account exists.
    #[instrument(skip(self, uow))]
    pub async fn get_balance(
        &self,
        uow: Option<&DatabaseTransaction>,
        id: AccountId,
    ) -> Result<Decimal, LedgerError> {
        let record = self.get_account(uow, id).await?;
        Ok(record.balance)
    }

    /// Reads the full record of `id`, including its version stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such account exists.
    #[instrument(skip(self, uow))]
    pub async fn get_account(
        &self,
        uow: Option<&DatabaseTransaction>,
        id: AccountId,
    ) -> Result<AccountRecord, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = find_account(unit.conn(), id).await;
        unit.finish(outcome).await
    }

    /// Reads the balance of `id` and holds an exclusive row lock on it until
    /// `txn` ends.
    ///
    /// Requires an open unit of work: a lock taken in a self-owned one would
    /// be released on return. SQLite ignores the row lock; its database-level
    /// writer lock serializes instead.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such account exists.
    #[instrument(skip(self, txn))]
    pub async fn lock_balance(
        &self,
        txn: &DatabaseTransaction,
        id: AccountId,
    ) -> Result<Decimal, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(LedgerError::NotFound(id))?;
        Ok(model.balance.value())
    }

    /// Overwrites the balance of `id` and stamps a fresh version.
    ///
    /// Returns the affected-row count: 0 when `id` does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the write fails.
    #[instrument(skip(self, uow))]
    pub async fn update_balance(
        &self,
        uow: Option<&DatabaseTransaction>,
        id: AccountId,
        new_balance: Decimal,
    ) -> Result<u64, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = self.write_balance(unit.conn(), id, new_balance, None).await;
        unit.finish(outcome).await
    }

    /// Overwrites the balance of `id` and stamps a fresh version, but only
    /// if the stored version still equals `expected_version`.
    ///
    /// Returns 0 when the precondition fails. That is not an error; the
    /// record is left untouched and the caller decides what it means.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the write fails.
    #[instrument(skip(self, uow))]
    pub async fn update_balance_if_version_matches(
        &self,
        uow: Option<&DatabaseTransaction>,
        id: AccountId,
        new_balance: Decimal,
        expected_version: VersionStamp,
    ) -> Result<u64, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = self
            .write_balance(unit.conn(), id, new_balance, Some(expected_version))
            .await;
        unit.finish(outcome).await
    }

    /// Lists every account in ascending ID order.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the read fails.
    #[instrument(skip(self, uow))]
    pub async fn list(
        &self,
        uow: Option<&DatabaseTransaction>,
    ) -> Result<Vec<AccountRecord>, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = accounts::Entity::find()
            .order_by_asc(accounts::Column::Id)
            .all(unit.conn())
            .await
            .map(|models| models.into_iter().map(AccountRecord::from).collect())
            .map_err(LedgerError::from);
        unit.finish(outcome).await
    }

    /// Sum of every account balance. Zero for an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the read fails.
    #[instrument(skip(self, uow))]
    pub async fn total_balance(
        &self,
        uow: Option<&DatabaseTransaction>,
    ) -> Result<Decimal, LedgerError> {
        let unit = UnitOfWork::enter(&self.gateway, uow, self.isolation).await?;
        let outcome = sum_balances(unit.conn()).await;
        unit.finish(outcome).await
    }

    /// Builds and runs the balance `UPDATE`, guarded by the version when
    /// `expected_version` is given.
    async fn write_balance<C>(
        &self,
        conn: &C,
        id: AccountId,
        new_balance: Decimal,
        expected_version: Option<VersionStamp>,
    ) -> Result<u64, LedgerError>
    where
        C: ConnectionTrait,
    {
        let mut update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                ExactDecimal(new_balance).to_expr(self.gateway.backend()),
            )
            .col_expr(
                accounts::Column::Version,
                Expr::value(VersionStamp::fresh().into_inner()),
            )
            .filter(accounts::Column::Id.eq(id.into_inner()));

        if let Some(expected) = expected_version {
            update = update.filter(accounts::Column::Version.eq(expected.into_inner()));
        }

        let statement = update.build(self.gateway.backend());
        let outcome = StoreGateway::execute(conn, statement).await?;
        Ok(outcome.rows_affected)
    }
}

async fn insert_account<C>(conn: &C, initial_balance: Decimal) -> Result<AccountId, LedgerError>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let mut insert = Query::insert();
    insert
        .into_table(accounts::Entity)
        .columns([accounts::Column::Balance, accounts::Column::Version])
        .values([
            ExactDecimal(initial_balance).to_expr(backend),
            Expr::value(VersionStamp::fresh().into_inner()),
        ])
        .map_err(|e| LedgerError::Store(DbErr::Custom(e.to_string())))?
        .returning_col(accounts::Column::Id);

    let row = conn
        .query_one(backend.build(&insert))
        .await?
        .ok_or_else(|| LedgerError::Store(DbErr::RecordNotInserted))?;
    let id: i64 = row.try_get("", "id")?;
    Ok(AccountId(id))
}

async fn sum_balances<C>(conn: &C) -> Result<Decimal, LedgerError>
where
    C: ConnectionTrait,
{
    match conn.get_database_backend() {
        // SUM over a TEXT column yields REAL, so SQLite totals are added here.
        DbBackend::Sqlite => {
            let balances = accounts::Entity::find()
                .select_only()
                .column(accounts::Column::Balance)
                .into_tuple::<ExactDecimal>()
                .all(conn)
                .await?;
            balances
                .into_iter()
                .try_fold(Decimal::ZERO, |total, balance| {
                    total.checked_add(balance.value())
                })
                .ok_or_else(|| LedgerError::Store(DbErr::Custom("Ledger total overflows".into())))
        }
        _ => {
            let total = accounts::Entity::find()
                .select_only()
                .column_as(Expr::col(accounts::Column::Balance).sum(), "total")
                .into_tuple::<Option<Decimal>>()
                .one(conn)
                .await?;
            Ok(total.flatten().unwrap_or(Decimal::ZERO))
        }
    }
}

async fn find_account<C>(conn: &C, id: AccountId) -> Result<AccountRecord, LedgerError>
where
    C: ConnectionTrait,
{
    accounts::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .map(AccountRecord::from)
        .ok_or(LedgerError::NotFound(id))
}
