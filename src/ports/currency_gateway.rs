//! Currency gateway port.
//!
//! The balance ledger belongs to a separate subsystem; this core only
//! consumes and refunds against it. Calls are never made while the store
//! critical section is held.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::OwnerId;
use crate::domain::naming::RegistryError;

/// Port for the external currency ledger.
#[async_trait]
pub trait CurrencyGateway: Send + Sync {
    /// Deducts `amount` from the owner's balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds` if the balance is below `amount`
    /// - `Unavailable` on any other gateway failure
    async fn consume(&self, owner: OwnerId, amount: i64, memo: &str) -> Result<i64, CurrencyError>;

    /// Credits `amount` back to the owner and returns the new balance.
    async fn add_back(&self, owner: OwnerId, amount: i64, memo: &str)
        -> Result<i64, CurrencyError>;

    /// Display name of the currency.
    fn currency_name(&self) -> &str;
}

/// Errors reported by the currency gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("insufficient funds: {required} required, {balance} available")]
    InsufficientFunds { balance: i64, required: i64 },

    #[error("currency gateway unavailable: {0}")]
    Unavailable(String),
}

impl CurrencyError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        CurrencyError::Unavailable(message.into())
    }
}

impl From<CurrencyError> for RegistryError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::InsufficientFunds { balance, required } => {
                RegistryError::InsufficientFunds { balance, required }
            }
            CurrencyError::Unavailable(message) => RegistryError::Gateway(message),
        }
    }
}
