//! Store gateway: the thin adapter between the ledger logic and the store.
//!
//! The gateway owns the connection pool and offers the three capabilities the
//! rest of the crate needs from a relational store:
//! - open a unit of work at a requested isolation level
//! - execute a statement and report the affected-row count
//! - run a read and return its rows as column-name keyed maps
//!
//! Commit, rollback and release are methods of the `DatabaseTransaction`
//! handed out by [`StoreGateway::open_unit_of_work`]; dropping an
//! uncommitted transaction rolls it back before the connection returns to
//! the pool.

use std::time::Duration;

use ledgerlock_shared::config::DatabaseConfig;
use ledgerlock_shared::types::Isolation;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, FromQueryResult, IsolationLevel, Statement, TransactionTrait,
};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Result of executing one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Rows inserted, updated or deleted (rows returned, for reads).
    pub rows_affected: u64,
    /// Result rows when the statement was a read.
    pub rows: Option<Vec<JsonValue>>,
}

/// Explicit handle on the ledger store.
///
/// Every repository and transfer operation receives one; there is no
/// process-wide default connection.
#[derive(Debug, Clone)]
pub struct StoreGateway {
    db: DatabaseConnection,
}

impl StoreGateway {
    /// Wraps an existing connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a connection pool configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(timeout)
            .acquire_timeout(timeout)
            .sqlx_logging(config.sqlx_logging);

        let db = Database::connect(options).await?;
        debug!(
            backend = ?db.get_database_backend(),
            max_connections = config.max_connections,
            "Store gateway connected"
        );
        Ok(Self { db })
    }

    /// The underlying pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The SQL dialect spoken by the store.
    #[must_use]
    pub fn backend(&self) -> DatabaseBackend {
        self.db.get_database_backend()
    }

    /// Opens a connection-scoped transaction at `isolation`.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or `BEGIN` fails.
    pub async fn open_unit_of_work(
        &self,
        isolation: Isolation,
    ) -> Result<DatabaseTransaction, DbErr> {
        // SQLite transactions are always serializable and reject the clause.
        let level = match self.backend() {
            DatabaseBackend::Sqlite => None,
            _ => Some(isolation_level(isolation)),
        };
        let txn = self.db.begin_with_config(level, None).await?;
        debug!(%isolation, "Unit of work opened");
        Ok(txn)
    }

    /// Executes one parameterized write and reports the affected-row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the statement.
    pub async fn execute<C>(conn: &C, statement: Statement) -> Result<QueryOutcome, DbErr>
    where
        C: ConnectionTrait,
    {
        debug!(sql = %statement.sql, "Executing statement");
        let result = conn.execute(statement).await?;
        Ok(QueryOutcome {
            rows_affected: result.rows_affected(),
            rows: None,
        })
    }

    /// Executes one parameterized read and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the statement or a value
    /// cannot be represented as JSON.
    pub async fn query<C>(conn: &C, statement: Statement) -> Result<QueryOutcome, DbErr>
    where
        C: ConnectionTrait,
    {
        debug!(sql = %statement.sql, "Running query");
        let rows = JsonValue::find_by_statement(statement).all(conn).await?;
        Ok(QueryOutcome {
            rows_affected: rows.len() as u64,
            rows: Some(rows),
        })
    }

    /// Closes the pool, waiting for checked-out connections to return.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be closed cleanly.
    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}

/// Maps the domain isolation level onto the store's.
const fn isolation_level(isolation: Isolation) -> IsolationLevel {
    match isolation {
        Isolation::Serializable => IsolationLevel::Serializable,
        Isolation::RepeatableRead => IsolationLevel::RepeatableRead,
        Isolation::ReadCommitted => IsolationLevel::ReadCommitted,
        Isolation::ReadUncommitted => IsolationLevel::ReadUncommitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Value;

    async fn memory_gateway() -> StoreGateway {
        let mut config = DatabaseConfig::with_url("sqlite::memory:");
        config.max_connections = 1;
        StoreGateway::connect(&config).await.unwrap()
    }

    #[test]
    fn test_isolation_mapping() {
        assert_eq!(
            isolation_level(Isolation::Serializable),
            IsolationLevel::Serializable
        );
        assert_eq!(
            isolation_level(Isolation::ReadCommitted),
            IsolationLevel::ReadCommitted
        );
    }

    #[tokio::test]
    async fn test_execute_reports_rows_affected() {
        let gateway = memory_gateway().await;
        let conn = gateway.connection();
        conn.execute_unprepared("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();

        let insert = Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO items (name) VALUES (?), (?)",
            [Value::from("a"), Value::from("b")],
        );
        let outcome = StoreGateway::execute(conn, insert).await.unwrap();

        assert_eq!(outcome.rows_affected, 2);
        assert!(outcome.rows.is_none());
    }

    #[tokio::test]
    async fn test_query_returns_rows_by_column_name() {
        let gateway = memory_gateway().await;
        let conn = gateway.connection();
        conn.execute_unprepared("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();
        conn.execute_unprepared("INSERT INTO items (name) VALUES ('a'), ('b')")
            .await
            .unwrap();

        let select = Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM items WHERE name = ?",
            [Value::from("b")],
        );
        let outcome = StoreGateway::query(conn, select).await.unwrap();

        assert_eq!(outcome.rows_affected, 1);
        let rows = outcome.rows.unwrap();
        assert_eq!(rows[0]["name"], JsonValue::from("b"));
    }

    #[tokio::test]
    async fn test_uncommitted_unit_of_work_is_rolled_back_on_drop() {
        let gateway = memory_gateway().await;
        let conn = gateway.connection();
        conn.execute_unprepared("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();

        {
            let txn = gateway
                .open_unit_of_work(Isolation::Serializable)
                .await
                .unwrap();
            txn.execute_unprepared("INSERT INTO items (name) VALUES ('lost')")
                .await
                .unwrap();
        }

        let select = Statement::from_string(DatabaseBackend::Sqlite, "SELECT name FROM items");
        let outcome = StoreGateway::query(conn, select).await.unwrap();
        assert_eq!(outcome.rows_affected, 0);
    }
}
