//! Registry and workflow error taxonomy.
//!
//! # Propagation
//!
//! | Error | Raised by | Recoverable |
//! |-------|-----------|-------------|
//! | InvalidName | pattern check, before any mutation | yes |
//! | InvalidCoinCost | apply, before any mutation | yes |
//! | NameRegistered | registry upsert, queue insert | yes |
//! | NameApplied | queue insert | yes |
//! | AlreadyApplied | queue insert | yes |
//! | ApplicationNotFound | accept / reject / cancel | yes |
//! | NameNotFound | toggle, owner has no name | yes |
//! | NameUnchanged | toggle to the current state | yes |
//! | InsufficientFunds | currency gateway | yes |
//! | Gateway | currency gateway | no |
//! | Store | backing store, invalidates the session | no |
//! | InternalInconsistency | unexpected row counts | no |
//! | Compensation | workflow, original plus compensation failure | no |
//! | ReservationConsumed | accept, reservation taken but not registered | no |

use std::fmt;

use thiserror::Error;

use super::{ApplicationRecord, NameRecord};
use crate::domain::foundation::{ApplicationId, ErrorCode, OwnerId, StoreError};

/// Key used to look up an application that turned out to be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationLookup {
    Id(ApplicationId),
    Owner(OwnerId),
}

impl fmt::Display for ApplicationLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationLookup::Id(id) => write!(f, "id {}", id),
            ApplicationLookup::Owner(owner) => write!(f, "owner {}", owner),
        }
    }
}

/// Errors raised by the registry, the queue, and the workflows over them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("invalid name '{name}': must be 2 to 4 CJK ideographs")]
    InvalidName { name: String },

    #[error("coin cost cannot be negative: {amount}")]
    InvalidCoinCost { amount: i64 },

    #[error("name '{}' is already registered", .0.name)]
    NameRegistered(NameRecord),

    #[error("name '{}' already has an open application (#{})", .0.requested_name, .0.id)]
    NameApplied(ApplicationRecord),

    #[error("owner already applied for '{}' (#{})", .0.requested_name, .0.id)]
    AlreadyApplied(ApplicationRecord),

    #[error("application not found for {0}")]
    ApplicationNotFound(ApplicationLookup),

    #[error("owner {0} has no registered name")]
    NameNotFound(OwnerId),

    #[error("name '{name}' is already {}", state_label(.enabled))]
    NameUnchanged { name: String, enabled: bool },

    #[error("insufficient funds: {required} required, {balance} available")]
    InsufficientFunds { balance: i64, required: i64 },

    #[error("currency gateway failure: {0}")]
    Gateway(String),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("{original}; compensation also failed: {compensation}")]
    Compensation {
        original: Box<RegistryError>,
        compensation: Box<RegistryError>,
    },

    #[error("application #{} was consumed but not registered: {cause}", .application.id)]
    ReservationConsumed {
        application: ApplicationRecord,
        cause: Box<RegistryError>,
    },
}

fn state_label(enabled: &bool) -> &'static str {
    if *enabled {
        "enabled"
    } else {
        "disabled"
    }
}

impl RegistryError {
    pub fn invalid_name(name: impl Into<String>) -> Self {
        RegistryError::InvalidName { name: name.into() }
    }

    pub fn not_found_by_id(id: ApplicationId) -> Self {
        RegistryError::ApplicationNotFound(ApplicationLookup::Id(id))
    }

    pub fn not_found_by_owner(owner: OwnerId) -> Self {
        RegistryError::ApplicationNotFound(ApplicationLookup::Owner(owner))
    }

    pub fn inconsistency(message: impl Into<String>) -> Self {
        RegistryError::InternalInconsistency(message.into())
    }

    /// Reports a failed operation together with its failed compensation.
    pub fn compensation(original: RegistryError, compensation: RegistryError) -> Self {
        RegistryError::Compensation {
            original: Box::new(original),
            compensation: Box::new(compensation),
        }
    }

    pub fn reservation_consumed(application: ApplicationRecord, cause: RegistryError) -> Self {
        RegistryError::ReservationConsumed {
            application,
            cause: Box::new(cause),
        }
    }

    /// Returns true if the backing store faulted, directly or during compensation.
    pub fn is_store_failure(&self) -> bool {
        match self {
            RegistryError::Store(_) => true,
            RegistryError::Compensation {
                original,
                compensation,
            } => original.is_store_failure() || compensation.is_store_failure(),
            RegistryError::ReservationConsumed { cause, .. } => cause.is_store_failure(),
            _ => false,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::InvalidName { .. } => ErrorCode::InvalidName,
            RegistryError::InvalidCoinCost { .. } => ErrorCode::InvalidCoinCost,
            RegistryError::NameRegistered(_) => ErrorCode::NameRegistered,
            RegistryError::NameApplied(_) => ErrorCode::NameApplied,
            RegistryError::AlreadyApplied(_) => ErrorCode::AlreadyApplied,
            RegistryError::ApplicationNotFound(_) => ErrorCode::ApplicationNotFound,
            RegistryError::NameNotFound(_) => ErrorCode::NameNotFound,
            RegistryError::NameUnchanged { .. } => ErrorCode::NameUnchanged,
            RegistryError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            RegistryError::Gateway(_) => ErrorCode::CurrencyUnavailable,
            RegistryError::Store(_) => ErrorCode::StoreFailure,
            RegistryError::InternalInconsistency(_) => ErrorCode::InternalInconsistency,
            RegistryError::Compensation { .. } => ErrorCode::CompensationFailed,
            RegistryError::ReservationConsumed { .. } => ErrorCode::ReservationConsumed,
        }
    }
}
