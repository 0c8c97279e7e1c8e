//! Interactive transfer flows.
//!
//! Inputs are collected first. The pessimistic flow previews balances with
//! plain reads and asks before it locks anything. The optimistic flow reads
//! its snapshot, asks between the read and write phases (no lock is held
//! there), and reports a conflict if another writer got in first.

use ledgerlock_core::transfer::TransferRequest;
use ledgerlock_db::{AccountRepository, OptimisticTransfer, PessimisticTransfer, StoreGateway};
use ledgerlock_shared::AppError;
use ledgerlock_shared::config::TransferConfig;
use ledgerlock_shared::types::{AccountId, ConcurrencyStrategy, TransferAmount};
use rust_decimal::Decimal;
use tracing::info;

use crate::commands::TransferArgs;
use crate::prompt::{LineSource, Prompter};

pub async fn run(
    gateway: &StoreGateway,
    config: &TransferConfig,
    args: TransferArgs,
) -> Result<(), AppError> {
    let mut prompter = Prompter::new(args.yes);
    run_with(gateway, config, args, &mut prompter).await
}

/// Runs a transfer with answers read from `prompter`.
pub async fn run_with<L: LineSource>(
    gateway: &StoreGateway,
    config: &TransferConfig,
    args: TransferArgs,
    prompter: &mut Prompter<L>,
) -> Result<(), AppError> {
    let strategy = args.strategy.unwrap_or(config.default_strategy);

    let source: AccountId = prompter.value_or_ask(args.from, "Source account ID")?;
    let target: AccountId = prompter.value_or_ask(args.to, "Target account ID")?;
    let amount: TransferAmount = prompter.value_or_ask(args.amount, "Amount")?;
    let request = TransferRequest::from_amount(source, target, amount)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    info!(%strategy, %source, %target, %amount, "Starting transfer");
    match strategy {
        ConcurrencyStrategy::Pessimistic => {
            pessimistic(gateway, config, &request, prompter).await
        }
        ConcurrencyStrategy::Optimistic => {
            optimistic(gateway, config, &request, prompter).await
        }
    }
}

async fn pessimistic<L: LineSource>(
    gateway: &StoreGateway,
    config: &TransferConfig,
    request: &TransferRequest,
    prompter: &mut Prompter<L>,
) -> Result<(), AppError> {
    println!("\n*** Transferring pessimistically ***\n");

    // Preview only; the transfer re-reads both balances under lock.
    let repo = AccountRepository::new(gateway.clone());
    let source_balance = repo.get_balance(None, request.source()).await?;
    confirm_balance(prompter, "Source", source_balance)?;
    let target_balance = repo.get_balance(None, request.target()).await?;
    confirm_balance(prompter, "Target", target_balance)?;

    let after = PessimisticTransfer::new(gateway.clone())
        .with_isolation(config.pessimistic_isolation)
        .transfer_in(None, request)
        .await?;

    report(request, after.source, after.target);
    Ok(())
}

async fn optimistic<L: LineSource>(
    gateway: &StoreGateway,
    config: &TransferConfig,
    request: &TransferRequest,
    prompter: &mut Prompter<L>,
) -> Result<(), AppError> {
    println!("\n*** Transferring optimistically ***\n");

    let operation =
        OptimisticTransfer::new(gateway.clone()).with_isolation(config.optimistic_isolation);
    let snapshot = operation
        .read_snapshot(request.source(), request.target())
        .await?;

    confirm_balance(prompter, "Source", snapshot.source.balance)?;
    confirm_balance(prompter, "Target", snapshot.target.balance)?;

    operation.apply(&snapshot, request.amount()).await?;

    report(
        request,
        snapshot.source.balance - request.amount(),
        snapshot.target.balance + request.amount(),
    );
    Ok(())
}

fn confirm_balance<L: LineSource>(
    prompter: &mut Prompter<L>,
    side: &str,
    balance: Decimal,
) -> Result<(), AppError> {
    if prompter.confirm(&format!("{side} balance = {balance}. Continue?"))? {
        Ok(())
    } else {
        Err(AppError::Aborted("transfer cancelled, nothing written".into()))
    }
}

fn report(request: &TransferRequest, source_balance: Decimal, target_balance: Decimal) {
    println!(
        "Transferred {} from {} to {}",
        request.amount(),
        request.source(),
        request.target()
    );
    println!("  {}: {source_balance}", request.source());
    println!("  {}: {target_balance}", request.target());
}
