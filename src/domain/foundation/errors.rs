//! Error types shared across layers.

use std::fmt;
use thiserror::Error;

/// Faults reported by the backing store.
///
/// Any of these invalidates the current session so the next operation
/// rebuilds it on a fresh connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{operation} failed: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    #[error("unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }

    pub fn query(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Query {
            operation,
            message: message.into(),
        }
    }

    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            constraint: constraint.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    InvalidName,
    InvalidCoinCost,

    // Conflict errors
    NameRegistered,
    NameApplied,
    AlreadyApplied,

    // Not found errors
    ApplicationNotFound,
    NameNotFound,

    // State errors
    NameUnchanged,

    // Currency errors
    InsufficientFunds,
    CurrencyUnavailable,

    // Partial failure errors
    CompensationFailed,
    ReservationConsumed,

    // Infrastructure errors
    StoreFailure,
    InternalInconsistency,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::InvalidCoinCost => "INVALID_COIN_COST",
            ErrorCode::NameRegistered => "NAME_REGISTERED",
            ErrorCode::NameApplied => "NAME_APPLIED",
            ErrorCode::AlreadyApplied => "ALREADY_APPLIED",
            ErrorCode::ApplicationNotFound => "APPLICATION_NOT_FOUND",
            ErrorCode::NameNotFound => "NAME_NOT_FOUND",
            ErrorCode::NameUnchanged => "NAME_UNCHANGED",
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::CurrencyUnavailable => "CURRENCY_UNAVAILABLE",
            ErrorCode::CompensationFailed => "COMPENSATION_FAILED",
            ErrorCode::ReservationConsumed => "RESERVATION_CONSUMED",
            ErrorCode::StoreFailure => "STORE_FAILURE",
            ErrorCode::InternalInconsistency => "INTERNAL_INCONSISTENCY",
        };
        write!(f, "{}", s)
    }
}

impl ErrorCode {
    /// Conflicts are expected outcomes of user input, not faults.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::NameRegistered | ErrorCode::NameApplied | ErrorCode::AlreadyApplied
        )
    }
}
