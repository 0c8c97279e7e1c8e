//! Exact decimal column type.
//!
//! PostgreSQL stores balances as `NUMERIC(19,4)` and hands them back as
//! `Decimal`. SQLite has no exact numeric type, and `SeaORM` moves SQLite
//! decimals through `f64` in both directions, so there the column is `TEXT`
//! holding the decimal's canonical string. This type reads either form and
//! [`ExactDecimal::to_expr`] writes the form the backend expects.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::sea_query::{
    ArrayType, ColumnType, Expr, Nullable, SimpleExpr, ValueType, ValueTypeErr,
};
use sea_orm::{ColIdx, DbBackend, DbErr, QueryResult, TryGetError, TryGetable, Value};
use serde::{Deserialize, Serialize};

/// A stored money value that never passes through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExactDecimal(pub Decimal);

impl ExactDecimal {
    /// The wrapped decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Bind expression for writing this value to `backend`.
    #[must_use]
    pub fn to_expr(self, backend: DbBackend) -> SimpleExpr {
        match backend {
            DbBackend::Sqlite => Expr::value(self.0.to_string()),
            _ => Expr::value(self.0),
        }
    }

    fn parse_stored(text: &str) -> Result<Self, DbErr> {
        Decimal::from_str(text.trim())
            .map(Self)
            .map_err(|e| DbErr::Type(format!("Stored balance {text:?} is not a decimal: {e}")))
    }
}

impl From<Decimal> for ExactDecimal {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<ExactDecimal> for Decimal {
    fn from(value: ExactDecimal) -> Self {
        value.0
    }
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ExactDecimal> for Value {
    fn from(value: ExactDecimal) -> Self {
        Self::Decimal(Some(Box::new(value.0)))
    }
}

impl Nullable for ExactDecimal {
    fn null() -> Value {
        Value::Decimal(None)
    }
}

impl ValueType for ExactDecimal {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(text)) => Self::parse_stored(&text).map_err(|_| ValueTypeErr),
            other => <Decimal as ValueType>::try_from(other).map(Self),
        }
    }

    fn type_name() -> String {
        "ExactDecimal".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::Decimal
    }

    fn column_type() -> ColumnType {
        ColumnType::Decimal(Some((19, 4)))
    }
}

impl TryGetable for ExactDecimal {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        // Text first: decoding a SQLite value as `Decimal` would succeed,
        // but through `f64`. A NUMERIC column rejects the text decode.
        match String::try_get_by(res, index) {
            Ok(text) => Self::parse_stored(&text).map_err(TryGetError::DbErr),
            Err(TryGetError::Null(column)) => Err(TryGetError::Null(column)),
            Err(TryGetError::DbErr(_)) => Decimal::try_get_by(res, index).map(Self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sqlite_binds_text() {
        let expr = ExactDecimal(dec!(123456789012345.0001)).to_expr(DbBackend::Sqlite);
        assert_eq!(expr, Expr::value("123456789012345.0001".to_owned()));
    }

    #[test]
    fn test_postgres_binds_decimal() {
        let expr = ExactDecimal(dec!(70.5)).to_expr(DbBackend::Postgres);
        assert_eq!(expr, Expr::value(dec!(70.5)));
    }

    #[test]
    fn test_value_type_accepts_both_forms() {
        let from_text =
            <ExactDecimal as ValueType>::try_from(Value::String(Some(Box::new("0.0001".into()))));
        assert_eq!(from_text.unwrap(), ExactDecimal(dec!(0.0001)));

        let from_decimal = <ExactDecimal as ValueType>::try_from(Value::from(dec!(12.5)));
        assert_eq!(from_decimal.unwrap(), ExactDecimal(dec!(12.5)));

        let garbage =
            <ExactDecimal as ValueType>::try_from(Value::String(Some(Box::new("1e".into()))));
        assert!(garbage.is_err());
    }
}
