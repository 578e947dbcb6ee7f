//! ToggleNameHandler - Command handler for enabling or disabling one's own name.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::NameRegistry;
use crate::config::PricingConfig;
use crate::domain::foundation::OwnerId;
use crate::domain::naming::RegistryError;
use crate::ports::CurrencyGateway;

/// Command to switch an owner's registered name on or off.
#[derive(Debug, Clone)]
pub struct ToggleNameCommand {
    pub owner: OwnerId,
    pub enabled: bool,
    /// Coins charged for the change; not refundable once it is applied.
    pub coin_cost: i64,
}

impl ToggleNameCommand {
    /// A toggle at the configured price.
    pub fn new(owner: OwnerId, enabled: bool, pricing: &PricingConfig) -> Self {
        Self {
            owner,
            enabled,
            coin_cost: pricing.coins_for_toggle,
        }
    }
}

/// Result of a successful toggle.
#[derive(Debug, Clone)]
pub struct ToggleNameResult {
    pub name: String,
    pub enabled: bool,
    pub coins_charged: i64,
    /// Balance after the charge, if any coins were charged.
    pub balance: Option<i64>,
}

/// Handler for self-service name toggles.
///
/// The coins are charged before the record is rewritten; a failed rewrite
/// gives them back.
pub struct ToggleNameHandler {
    registry: Arc<NameRegistry>,
    currency: Arc<dyn CurrencyGateway>,
}

impl ToggleNameHandler {
    pub fn new(registry: Arc<NameRegistry>, currency: Arc<dyn CurrencyGateway>) -> Self {
        Self { registry, currency }
    }

    pub async fn handle(&self, cmd: ToggleNameCommand) -> Result<ToggleNameResult, RegistryError> {
        if cmd.coin_cost < 0 {
            return Err(RegistryError::InvalidCoinCost {
                amount: cmd.coin_cost,
            });
        }

        // 1. Look up the current state
        let record = self
            .registry
            .query_by_owner(cmd.owner)
            .await?
            .ok_or(RegistryError::NameNotFound(cmd.owner))?;

        if record.enabled == cmd.enabled {
            return Err(RegistryError::NameUnchanged {
                name: record.name,
                enabled: record.enabled,
            });
        }

        // 2. Charge, outside the session lock
        let memo = if cmd.enabled {
            format!("enable name {}", record.name)
        } else {
            format!("disable name {}", record.name)
        };
        let balance = if cmd.coin_cost > 0 {
            Some(
                self.currency
                    .consume(cmd.owner, cmd.coin_cost, &memo)
                    .await?,
            )
        } else {
            None
        };

        // 3. Rewrite the record
        let failure = match self.registry.set_enabled(cmd.owner, cmd.enabled).await {
            Ok(true) => {
                info!(
                    owner = %cmd.owner,
                    name = %record.name,
                    enabled = cmd.enabled,
                    coins = cmd.coin_cost,
                    "name toggled by owner"
                );
                return Ok(ToggleNameResult {
                    name: record.name,
                    enabled: cmd.enabled,
                    coins_charged: cmd.coin_cost,
                    balance,
                });
            }
            // removed while the charge was in flight
            Ok(false) => RegistryError::NameNotFound(cmd.owner),
            Err(e) => e,
        };

        // 4. Compensate: give the coins back
        if balance.is_none() {
            return Err(failure);
        }
        warn!(owner = %cmd.owner, error = %failure, "toggle failed, refunding charge");
        let refund_memo = format!("refund: {}", memo);
        match self
            .currency
            .add_back(cmd.owner, cmd.coin_cost, &refund_memo)
            .await
        {
            Ok(_) => Err(failure),
            Err(e) => {
                let compensation = RegistryError::from(e);
                error!(owner = %cmd.owner, coins = cmd.coin_cost, error = %compensation, "failed to refund toggle charge");
                Err(RegistryError::compensation(failure, compensation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::naming::NameRecord;

    fn registered(h: &Harness, name: &str, enabled: bool) -> OwnerId {
        let owner = OwnerId::new();
        let mut record = NameRecord::enabled_now(owner, name);
        record.enabled = enabled;
        h.source.insert_name_unchecked(record);
        h.ledger.set_balance(owner, 10);
        owner
    }

    fn pricing() -> PricingConfig {
        PricingConfig::default()
    }

    #[tokio::test]
    async fn disable_charges_one_coin_and_rewrites_record() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);

        let result = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, false, &pricing()))
            .await
            .unwrap();

        assert_eq!(result.name, "张三");
        assert!(!result.enabled);
        assert_eq!(result.coins_charged, 1);
        assert_eq!(result.balance, Some(9));
        assert!(!h.registry.query_by_owner(owner).await.unwrap().unwrap().enabled);
        assert!(h.ledger.entries()[0].memo.contains("张三"));
    }

    #[tokio::test]
    async fn enable_restores_a_disabled_name() {
        let h = Harness::new();
        let owner = registered(&h, "张三", false);

        h.toggle_handler()
            .handle(ToggleNameCommand::new(owner, true, &pricing()))
            .await
            .unwrap();

        assert!(h.registry.query_by_owner(owner).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn owner_without_name_is_not_charged() {
        let h = Harness::new();
        let owner = OwnerId::new();

        let err = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, true, &pricing()))
            .await
            .unwrap_err();

        assert_eq!(err, RegistryError::NameNotFound(owner));
        assert_eq!(h.gateway.consume_calls(), 0);
    }

    #[tokio::test]
    async fn toggle_to_current_state_is_refused_without_charge() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);

        let err = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, true, &pricing()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NameUnchanged);
        assert_eq!(h.gateway.consume_calls(), 0);
        assert_eq!(h.ledger.balance_of(owner), 10);
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_record_untouched() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);
        h.ledger.set_balance(owner, 0);

        let err = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, false, &pricing()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InsufficientFunds);
        assert!(h.registry.query_by_owner(owner).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn failed_rewrite_refunds_the_charge() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);
        h.gateway.on_consume({
            let source = h.source.clone();
            move || source.fail_next_queries(1)
        });

        let err = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, false, &pricing()))
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(h.gateway.add_back_calls(), 1);
        assert_eq!(h.ledger.balance_of(owner), 10);
        assert!(h.registry.query_by_owner(owner).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn failed_refund_reports_both_errors() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);
        h.gateway.fail_add_back(true);
        h.gateway.on_consume({
            let source = h.source.clone();
            move || source.fail_next_queries(1)
        });

        let err = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, false, &pricing()))
            .await
            .unwrap_err();

        match err {
            RegistryError::Compensation {
                original,
                compensation,
            } => {
                assert!(original.is_store_failure());
                assert_eq!(compensation.code(), ErrorCode::CurrencyUnavailable);
            }
            other => panic!("expected Compensation, got {:?}", other),
        }
        assert_eq!(h.ledger.balance_of(owner), 9);
    }

    #[tokio::test]
    async fn free_toggle_never_calls_gateway() {
        let h = Harness::new();
        let owner = registered(&h, "张三", true);
        let free = PricingConfig {
            coins_for_toggle: 0,
            ..Default::default()
        };

        let result = h
            .toggle_handler()
            .handle(ToggleNameCommand::new(owner, false, &free))
            .await
            .unwrap();

        assert_eq!(result.balance, None);
        assert_eq!(h.gateway.consume_calls(), 0);
    }
}
