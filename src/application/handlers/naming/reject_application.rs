//! RejectApplicationHandler - Command handler for refusing a reservation.

use std::sync::Arc;

use tracing::info;

use super::refund::refund_or_restore;
use crate::application::ApplicationQueue;
use crate::domain::foundation::ApplicationId;
use crate::domain::naming::{ApplicationRecord, RegistryError};
use crate::ports::CurrencyGateway;

/// Command to reject an application.
#[derive(Debug, Clone)]
pub struct RejectApplicationCommand {
    pub id: ApplicationId,
    /// Who rejected it; recorded in the refund memo.
    pub reviewer: String,
}

/// Result of a rejected application.
#[derive(Debug, Clone)]
pub struct RejectApplicationResult {
    pub application: ApplicationRecord,
    pub refunded: i64,
    /// Owner's balance after the refund, if anything was refunded.
    pub balance: Option<i64>,
}

/// Handler for administrative rejection.
pub struct RejectApplicationHandler {
    queue: Arc<ApplicationQueue>,
    currency: Arc<dyn CurrencyGateway>,
}

impl RejectApplicationHandler {
    pub fn new(queue: Arc<ApplicationQueue>, currency: Arc<dyn CurrencyGateway>) -> Self {
        Self { queue, currency }
    }

    pub async fn handle(
        &self,
        cmd: RejectApplicationCommand,
    ) -> Result<RejectApplicationResult, RegistryError> {
        let application = self
            .queue
            .take_by_id(cmd.id)
            .await?
            .ok_or_else(|| RegistryError::not_found_by_id(cmd.id))?;

        let memo = format!(
            "application for {} rejected by {}, refund",
            application.requested_name, cmd.reviewer
        );
        let balance =
            refund_or_restore(&self.queue, self.currency.as_ref(), &application, &memo).await?;
        let refunded = balance.map_or(0, |_| application.reserved_coins);

        info!(
            id = %application.id,
            owner = %application.owner,
            name = %application.requested_name,
            refunded,
            reviewer = %cmd.reviewer,
            "application rejected"
        );
        Ok(RejectApplicationResult {
            application,
            refunded,
            balance,
        })
    }
}
