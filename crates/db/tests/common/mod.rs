//! Shared fixtures for the store-backed integration tests.

#![allow(dead_code)]

use ledgerlock_db::StoreGateway;
use ledgerlock_db::migration::{Migrator, MigratorTrait};
use ledgerlock_shared::config::DatabaseConfig;
use tempfile::TempDir;

/// A migrated ledger in a temporary SQLite file.
///
/// The directory is removed when the ledger is dropped.
pub struct TestLedger {
    pub gateway: StoreGateway,
    _dir: TempDir,
}

/// Creates an empty, migrated ledger.
pub async fn sqlite_ledger() -> TestLedger {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ledger.db");
    let mut config = DatabaseConfig::with_url(format!("sqlite://{}?mode=rwc", path.display()));
    config.max_connections = 4;

    let gateway = StoreGateway::connect(&config)
        .await
        .expect("Failed to open SQLite ledger");
    Migrator::up(gateway.connection(), None)
        .await
        .expect("Failed to run migrations");

    TestLedger { gateway, _dir: dir }
}
