//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the transfer logic.

pub mod account;

pub use account::{AccountRecord, AccountRepository};
