//! Core business logic for LedgerLock.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! The rules shared by both concurrency strategies live here; the strategies
//! themselves live in `ledgerlock-db`, next to the store they coordinate.
//!
//! # Modules
//!
//! - `transfer` - Request validation and balance planning for transfers

pub mod transfer;
