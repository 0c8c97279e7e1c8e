//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use ledgerlock_shared::types::{AccountId, ConcurrencyStrategy, TransferAmount};
use rust_decimal::Decimal;

/// Operate on the ledger: create and inspect accounts, transfer between them.
#[derive(Debug, Parser)]
#[command(name = "ledgerlock", version, about)]
pub struct Cli {
    /// Store URL; overrides `LEDGERLOCK__DATABASE__URL`.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and print its ID.
    Create {
        /// Opening balance.
        #[arg(allow_hyphen_values = true)]
        balance: Decimal,
    },
    /// Print one account.
    Show {
        /// Account ID.
        id: AccountId,
    },
    /// Print every account and the ledger total.
    List,
    /// Move value between two accounts.
    Transfer(TransferArgs),
}

/// Arguments of `transfer`. Missing values are prompted for.
#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Concurrency strategy; defaults to `transfer.default_strategy`.
    #[arg(long, short)]
    pub strategy: Option<ConcurrencyStrategy>,

    /// Account to debit.
    #[arg(long)]
    pub from: Option<AccountId>,

    /// Account to credit.
    #[arg(long)]
    pub to: Option<AccountId>,

    /// Amount to move; must be positive.
    #[arg(long)]
    pub amount: Option<TransferAmount>,

    /// Answer yes to every confirmation.
    #[arg(long, short)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transfer_flags() {
        let cli = Cli::try_parse_from([
            "ledgerlock",
            "transfer",
            "--strategy",
            "optimistic",
            "--from",
            "1",
            "--to",
            "2",
            "--amount",
            "30",
            "--yes",
        ])
        .unwrap();

        let Command::Transfer(args) = cli.command else {
            panic!("expected transfer");
        };
        assert_eq!(args.strategy, Some(ConcurrencyStrategy::Optimistic));
        assert_eq!(args.from, Some(AccountId(1)));
        assert_eq!(args.to, Some(AccountId(2)));
        assert_eq!(args.amount.map(TransferAmount::value), Some(dec!(30)));
        assert!(args.yes);
    }

    #[test]
    fn test_parse_transfer_without_values() {
        let cli = Cli::try_parse_from(["ledgerlock", "transfer"]).unwrap();
        let Command::Transfer(args) = cli.command else {
            panic!("expected transfer");
        };
        assert!(args.strategy.is_none());
        assert!(args.from.is_none());
        assert!(!args.yes);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["ledgerlock", "transfer", "--amount", "-5"]).is_err());
        assert!(Cli::try_parse_from(["ledgerlock", "transfer", "--from", "abc"]).is_err());
        assert!(Cli::try_parse_from(["ledgerlock", "show", "0"]).is_err());
    }

    #[test]
    fn test_create_accepts_negative_balance() {
        let cli = Cli::try_parse_from(["ledgerlock", "create", "-10"]).unwrap();
        assert!(matches!(cli.command, Command::Create { balance } if balance == dec!(-10)));
    }
}
