//! ApplyForNameHandler - Command handler for reserving a name.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::ApplicationQueue;
use crate::config::PricingConfig;
use crate::domain::foundation::{ApplicationId, OwnerId};
use crate::domain::naming::{NewApplication, RegistryError};
use crate::ports::CurrencyGateway;

/// Whether the requested name must match the ideograph pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameValidation {
    /// Normal applications: 2 to 4 CJK ideographs.
    Checked,
    /// Privileged applications skip the pattern; uniqueness still applies.
    Unchecked,
}

/// Command to apply for a name.
#[derive(Debug, Clone)]
pub struct ApplyForNameCommand {
    pub owner: OwnerId,
    pub name: String,
    /// Coins held against the application until it is accepted or refunded.
    pub coin_cost: i64,
    pub validation: NameValidation,
}

impl ApplyForNameCommand {
    /// A pattern-checked application at the normal price.
    pub fn normal(owner: OwnerId, name: impl Into<String>, pricing: &PricingConfig) -> Self {
        Self {
            owner,
            name: name.into(),
            coin_cost: pricing.coins_for_normal,
            validation: NameValidation::Checked,
        }
    }

    /// A special application: any name, at the special price plus
    /// `extra_coins`.
    ///
    /// # Errors
    ///
    /// - `InvalidCoinCost` if `extra_coins` is negative
    pub fn special(
        owner: OwnerId,
        name: impl Into<String>,
        extra_coins: i64,
        pricing: &PricingConfig,
    ) -> Result<Self, RegistryError> {
        if extra_coins < 0 {
            return Err(RegistryError::InvalidCoinCost {
                amount: extra_coins,
            });
        }
        Ok(Self {
            owner,
            name: name.into(),
            coin_cost: pricing.coins_for_special.saturating_add(extra_coins),
            validation: NameValidation::Unchecked,
        })
    }

    fn memo(&self) -> String {
        match self.validation {
            NameValidation::Checked => {
                format!("apply for name {} (refunded if rejected)", self.name)
            }
            NameValidation::Unchecked => format!("apply for special name {}", self.name),
        }
    }
}

/// Result of a successful application.
#[derive(Debug, Clone)]
pub struct ApplyForNameResult {
    pub application_id: ApplicationId,
    pub coins_reserved: i64,
    /// Balance after the reservation, if any coins were charged.
    pub balance: Option<i64>,
}

/// Handler for name applications.
///
/// The application row is written first and the coins charged second, so
/// a failed charge leaves a row that is deleted again before returning.
pub struct ApplyForNameHandler {
    queue: Arc<ApplicationQueue>,
    currency: Arc<dyn CurrencyGateway>,
}

impl ApplyForNameHandler {
    pub fn new(queue: Arc<ApplicationQueue>, currency: Arc<dyn CurrencyGateway>) -> Self {
        Self { queue, currency }
    }

    pub async fn handle(
        &self,
        cmd: ApplyForNameCommand,
    ) -> Result<ApplyForNameResult, RegistryError> {
        if cmd.coin_cost < 0 {
            return Err(RegistryError::InvalidCoinCost {
                amount: cmd.coin_cost,
            });
        }

        // 1. Reserve the name
        let application = NewApplication::new(cmd.owner, cmd.name.clone(), cmd.coin_cost);
        let id = match cmd.validation {
            NameValidation::Checked => self.queue.add_with_check(&application).await?,
            NameValidation::Unchecked => self.queue.add_no_check(&application).await?,
        };

        if cmd.coin_cost == 0 {
            info!(id = %id, owner = %cmd.owner, name = %cmd.name, "free application accepted");
            return Ok(ApplyForNameResult {
                application_id: id,
                coins_reserved: 0,
                balance: None,
            });
        }

        // 2. Charge the reservation, outside the session lock
        match self
            .currency
            .consume(cmd.owner, cmd.coin_cost, &cmd.memo())
            .await
        {
            Ok(balance) => {
                info!(
                    id = %id,
                    owner = %cmd.owner,
                    name = %cmd.name,
                    coins = cmd.coin_cost,
                    currency = self.currency.currency_name(),
                    "application reserved"
                );
                Ok(ApplyForNameResult {
                    application_id: id,
                    coins_reserved: cmd.coin_cost,
                    balance: Some(balance),
                })
            }
            Err(e) => {
                // 3. Compensate: drop the reservation that was never paid for
                let original = RegistryError::from(e);
                warn!(id = %id, owner = %cmd.owner, error = %original, "charge failed, withdrawing application");
                match self.queue.take_by_id(id).await {
                    Ok(Some(_)) => Err(original),
                    Ok(None) => {
                        // accepted or rejected while the charge was in flight
                        error!(id = %id, owner = %cmd.owner, "unpaid application consumed before withdrawal");
                        Err(RegistryError::compensation(
                            original,
                            RegistryError::inconsistency(format!(
                                "application #{} consumed before withdrawal",
                                id
                            )),
                        ))
                    }
                    Err(compensation) => {
                        error!(id = %id, error = %compensation, "failed to withdraw unpaid application");
                        Err(RegistryError::compensation(original, compensation))
                    }
                }
            }
        }
    }
}
