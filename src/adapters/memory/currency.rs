//! In-memory currency ledger.
//!
//! Stands in for the external currency subsystem in development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::OwnerId;
use crate::ports::{CurrencyError, CurrencyGateway};

/// One balance change recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub owner: OwnerId,
    /// Negative for consumption, positive for refunds.
    pub delta: i64,
    pub memo: String,
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<OwnerId, i64>,
    entries: Vec<LedgerEntry>,
}

/// In-memory implementation of the `CurrencyGateway` port.
pub struct InMemoryCurrencyGateway {
    currency_name: String,
    ledger: Mutex<Ledger>,
}

impl Default for InMemoryCurrencyGateway {
    fn default() -> Self {
        Self::new("coins")
    }
}

impl InMemoryCurrencyGateway {
    pub fn new(currency_name: impl Into<String>) -> Self {
        Self {
            currency_name: currency_name.into(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sets an owner's balance, replacing any previous value.
    pub fn set_balance(&self, owner: OwnerId, balance: i64) {
        self.ledger().balances.insert(owner, balance);
    }

    /// Returns an owner's balance; unknown owners hold zero.
    pub fn balance_of(&self, owner: OwnerId) -> i64 {
        self.ledger().balances.get(&owner).copied().unwrap_or(0)
    }

    /// Returns every recorded balance change in order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.ledger().entries.clone()
    }
}

#[async_trait]
impl CurrencyGateway for InMemoryCurrencyGateway {
    async fn consume(&self, owner: OwnerId, amount: i64, memo: &str) -> Result<i64, CurrencyError> {
        if amount < 0 {
            return Err(CurrencyError::unavailable(format!(
                "cannot consume a negative amount ({})",
                amount
            )));
        }

        let mut ledger = self.ledger();
        let balance = ledger.balances.get(&owner).copied().unwrap_or(0);
        if balance < amount {
            return Err(CurrencyError::InsufficientFunds {
                balance,
                required: amount,
            });
        }

        let remaining = balance - amount;
        ledger.balances.insert(owner, remaining);
        ledger.entries.push(LedgerEntry {
            owner,
            delta: -amount,
            memo: memo.to_string(),
        });
        Ok(remaining)
    }

    async fn add_back(
        &self,
        owner: OwnerId,
        amount: i64,
        memo: &str,
    ) -> Result<i64, CurrencyError> {
        if amount < 0 {
            return Err(CurrencyError::unavailable(format!(
                "cannot refund a negative amount ({})",
                amount
            )));
        }

        let mut ledger = self.ledger();
        let balance = ledger.balances.get(&owner).copied().unwrap_or(0);
        let updated = balance.checked_add(amount).ok_or_else(|| {
            CurrencyError::unavailable(format!(
                "refund of {} would overflow balance {}",
                amount, balance
            ))
        })?;
        ledger.balances.insert(owner, updated);
        ledger.entries.push(LedgerEntry {
            owner,
            delta: amount,
            memo: memo.to_string(),
        });
        Ok(updated)
    }

    fn currency_name(&self) -> &str {
        &self.currency_name
    }
}
