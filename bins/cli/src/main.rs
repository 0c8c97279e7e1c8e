//! LedgerLock operator CLI.
//!
//! Exit codes: 0 success, 2 invalid input, 3 unknown account, 4 conflict
//! (nothing written, retry is safe), 5 declined by the operator, 1 store or
//! internal failure.

mod accounts;
mod commands;
mod prompt;
mod transfer;

use std::process;

use anyhow::Context;
use clap::Parser;
use ledgerlock_db::StoreGateway;
use ledgerlock_shared::config::LoggingConfig;
use ledgerlock_shared::{AppConfig, AppError};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{Cli, Command};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            let app_err = err.downcast_ref::<AppError>();
            eprintln!("error: {err:#}");
            if app_err.is_some_and(AppError::is_retry_safe) {
                eprintln!("Nothing was written; retrying is safe.");
            }
            app_err.map_or(1, AppError::exit_code)
        }
    };
    process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.database_url.as_deref())?;
    init_tracing(&config.logging, cli.json_logs);

    let gateway = StoreGateway::connect(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
        .context("Failed to connect to database")?;
    debug!(backend = ?gateway.backend(), "Connected");

    let outcome = match cli.command {
        Command::Create { balance } => accounts::create(&gateway, balance).await,
        Command::Show { id } => accounts::show(&gateway, id).await,
        Command::List => accounts::list(&gateway).await,
        Command::Transfer(args) => transfer::run(&gateway, &config.transfer, args).await,
    };

    if let Err(e) = gateway.close().await {
        debug!(error = %e, "Pool did not close cleanly");
    }
    outcome.map_err(anyhow::Error::from)
}

/// Layered configuration, with `--database-url` taking precedence. When the
/// flag is given no other source needs a URL, but every source must still
/// parse.
fn load_config(database_url: Option<&str>) -> anyhow::Result<AppConfig> {
    AppConfig::load_with_database_url(database_url).map_err(|e| {
        let hint = if database_url.is_some() {
            ""
        } else {
            "; set LEDGERLOCK__DATABASE__URL or pass --database-url"
        };
        AppError::Validation(format!("invalid configuration ({e}){hint}")).into()
    })
}

fn init_tracing(logging: &LoggingConfig, json_flag: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ledgerlock=info,sea_orm=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays pipeable.
    if logging.json || json_flag {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_supplies_missing_url() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = load_config(Some("sqlite::memory:")).unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");

                let err = load_config(None).unwrap_err();
                assert_eq!(err.downcast_ref::<AppError>().map(AppError::exit_code), Some(2));
            },
        );
    }

    #[test]
    fn test_flag_does_not_hide_broken_config() {
        temp_env::with_vars(
            [
                ("LEDGERLOCK__DATABASE__MIN_CONNECTIONS", Some("-")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let err = load_config(Some("sqlite::memory:")).unwrap_err();
                assert!(err.to_string().contains("invalid configuration"), "{err}");
            },
        );
    }
}
