//! `SeaORM` entity definitions.

pub mod accounts;
pub mod exact_decimal;

pub use exact_decimal::ExactDecimal;
