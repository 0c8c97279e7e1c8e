//! Database layer for the ledger.
//!
//! This crate provides:
//! - The store gateway over a `SeaORM` connection pool
//! - The unit-of-work manager shared by every operation
//! - The `accounts` entity, its migration, and the account repository
//! - Pessimistic and optimistic transfer operations

pub mod entities;
pub mod error;
pub mod gateway;
pub mod migration;
pub mod repositories;
pub mod transfer;
pub mod unit_of_work;

pub use error::LedgerError;
pub use gateway::{QueryOutcome, StoreGateway};
pub use repositories::{AccountRecord, AccountRepository};
pub use transfer::{OptimisticTransfer, PessimisticTransfer, TransferSnapshot};
pub use unit_of_work::UnitOfWork;
