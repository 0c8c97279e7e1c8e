//! Accounts migration.
//!
//! Creates the single ledger relation `(id, balance, version)`. The DDL is
//! written per backend: PostgreSQL in production, SQLite for local runs and
//! the integration tests.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let sql = match manager.get_database_backend() {
            DatabaseBackend::Sqlite => ACCOUNTS_SQLITE_SQL,
            _ => ACCOUNTS_POSTGRES_SQL,
        };
        db.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS accounts;")
            .await?;
        Ok(())
    }
}

const ACCOUNTS_POSTGRES_SQL: &str = r"
-- One row per ledger line item. `version` is regenerated on every write
-- and is only ever compared for equality.
CREATE TABLE IF NOT EXISTS accounts (
    id BIGSERIAL PRIMARY KEY,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    version UUID NOT NULL
);
";

// SQLite has no exact numeric type; balances are kept as decimal text.
const ACCOUNTS_SQLITE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    balance TEXT NOT NULL DEFAULT '0',
    version BLOB NOT NULL
);
";
