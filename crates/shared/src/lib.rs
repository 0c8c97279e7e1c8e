//! Shared types, errors, and configuration for LedgerLock.
//!
//! This crate provides common types used across all other crates:
//! - Typed account IDs and version stamps
//! - Validated transfer amounts with decimal precision
//! - Isolation levels and concurrency strategies
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
