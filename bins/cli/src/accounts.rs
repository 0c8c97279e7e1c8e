//! Account commands: create, show, list.

use ledgerlock_db::{AccountRepository, StoreGateway};
use ledgerlock_shared::AppError;
use ledgerlock_shared::types::AccountId;
use rust_decimal::Decimal;

pub async fn create(gateway: &StoreGateway, balance: Decimal) -> Result<(), AppError> {
    let repo = AccountRepository::new(gateway.clone());
    let id = repo.create(None, balance).await?;
    println!("{id}");
    Ok(())
}

pub async fn show(gateway: &StoreGateway, id: AccountId) -> Result<(), AppError> {
    let repo = AccountRepository::new(gateway.clone());
    let account = repo.get_account(None, id).await?;
    println!("id:      {}", account.id);
    println!("balance: {}", account.balance);
    println!("version: {}", account.version);
    Ok(())
}

pub async fn list(gateway: &StoreGateway) -> Result<(), AppError> {
    let repo = AccountRepository::new(gateway.clone());
    let accounts = repo.list(None).await?;
    let total = repo.total_balance(None).await?;

    println!("{:>8}  {:>16}  version", "id", "balance");
    for account in &accounts {
        println!(
            "{:>8}  {:>16}  {}",
            account.id.to_string(),
            account.balance.to_string(),
            account.version
        );
    }
    println!("{} accounts, total {total}", accounts.len());
    Ok(())
}
