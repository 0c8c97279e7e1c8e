//! Demo account seeder for LedgerLock development and testing.
//!
//! Creates `count` accounts (default 2) in one unit of work so a fresh
//! ledger has something to transfer between. The first two accounts hold
//! 100 and 50; the rest start at 10. Skips seeding when the ledger already
//! has accounts.
//!
//! Usage: seeder [count]

use anyhow::{Context, bail};
use ledgerlock_db::{AccountRepository, StoreGateway, UnitOfWork};
use ledgerlock_shared::AppConfig;
use ledgerlock_shared::types::Isolation;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_COUNT: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerlock=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let count = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("Invalid account count '{arg}'"))?,
        None => DEFAULT_COUNT,
    };
    if count == 0 {
        bail!("Account count must be at least 1");
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    let gateway = StoreGateway::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let repo = AccountRepository::new(gateway.clone());

    let existing = repo.list(None).await?;
    if !existing.is_empty() {
        println!(
            "Ledger already has {} accounts, skipping...",
            existing.len()
        );
        return Ok(());
    }

    let unit = UnitOfWork::enter(&gateway, None, Isolation::Serializable).await?;
    let mut created = Vec::with_capacity(count);
    let mut outcome = Ok(());
    for index in 0..count {
        match repo.create(Some(unit.conn()), opening_balance(index)).await {
            Ok(id) => created.push(id),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }
    unit.finish(outcome).await?;

    for id in &created {
        println!("  Created account {id}");
    }
    info!(count = created.len(), "Seeding complete");
    println!("Seeding complete!");
    Ok(())
}

fn opening_balance(index: usize) -> Decimal {
    match index {
        0 => Decimal::ONE_HUNDRED,
        1 => Decimal::from(50),
        _ => Decimal::TEN,
    }
}
