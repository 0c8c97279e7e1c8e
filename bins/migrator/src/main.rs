//! Database migration runner for LedgerLock.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured).
//!
//! Usage:
//!   migrator up      - Create the accounts table
//!   migrator down    - Drop the accounts table
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-run migrations

use ledgerlock_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The migrator CLI sets up its own tracing.
    cli::run_cli(Migrator).await;
}
