//! CancelApplicationHandler - Command handler for withdrawing one's own
//! application.

use std::sync::Arc;

use tracing::info;

use super::refund::refund_or_restore;
use crate::application::ApplicationQueue;
use crate::domain::foundation::OwnerId;
use crate::domain::naming::{ApplicationRecord, RegistryError};
use crate::ports::CurrencyGateway;

/// Command to cancel the owner's open application.
#[derive(Debug, Clone)]
pub struct CancelApplicationCommand {
    pub owner: OwnerId,
}

/// Result of a cancelled application.
#[derive(Debug, Clone)]
pub struct CancelApplicationResult {
    pub application: ApplicationRecord,
    pub refunded: i64,
    pub balance: Option<i64>,
}

/// Handler for self-service cancellation. Same refund rules as rejection.
pub struct CancelApplicationHandler {
    queue: Arc<ApplicationQueue>,
    currency: Arc<dyn CurrencyGateway>,
}

impl CancelApplicationHandler {
    pub fn new(queue: Arc<ApplicationQueue>, currency: Arc<dyn CurrencyGateway>) -> Self {
        Self { queue, currency }
    }

    pub async fn handle(
        &self,
        cmd: CancelApplicationCommand,
    ) -> Result<CancelApplicationResult, RegistryError> {
        let application = self
            .queue
            .take_by_owner(cmd.owner)
            .await?
            .ok_or_else(|| RegistryError::not_found_by_owner(cmd.owner))?;

        let memo = format!("cancelled application for {}", application.requested_name);
        let balance =
            refund_or_restore(&self.queue, self.currency.as_ref(), &application, &memo).await?;
        let refunded = balance.map_or(0, |_| application.reserved_coins);

        info!(
            id = %application.id,
            owner = %application.owner,
            name = %application.requested_name,
            refunded,
            "application cancelled"
        );
        Ok(CancelApplicationResult {
            application,
            refunded,
            balance,
        })
    }
}
