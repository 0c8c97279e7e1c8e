//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types, as reported to an operator.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced account does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input at the caller boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A concurrent writer won; nothing was written.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operator declined to continue.
    #[error("Aborted: {0}")]
    Aborted(String),

    /// Infrastructure failure in the store.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::NotFound(_) => 3,
            Self::Conflict(_) => 4,
            Self::Aborted(_) => 5,
            Self::Database(_) | Self::Internal(_) => 1,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Aborted(_) => "ABORTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failed operation left no trace, so retrying is safe.
    #[must_use]
    pub const fn is_retry_safe(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

impl From<crate::types::AmountParseError> for AppError {
    fn from(err: crate::types::AmountParseError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<crate::types::AccountIdParseError> for AppError {
    fn from(err: crate::types::AccountIdParseError) -> Self {
        Self::Validation(err.to_string())
    }
}
