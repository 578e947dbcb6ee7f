//! AcceptApplicationHandler - Command handler for approving a reservation.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::{ApplicationQueue, NameRegistry};
use crate::domain::foundation::ApplicationId;
use crate::domain::naming::{ApplicationRecord, NameRecord, RegistryError, UpsertOutcome};

/// Command to accept an application.
#[derive(Debug, Clone)]
pub struct AcceptApplicationCommand {
    pub id: ApplicationId,
}

/// Result of an accepted application.
#[derive(Debug, Clone)]
pub struct AcceptApplicationResult {
    pub application: ApplicationRecord,
    pub record: NameRecord,
    pub outcome: UpsertOutcome,
}

/// Handler for accepting applications.
///
/// The reservation is consumed before the name is written. If the registry
/// refuses the name, the reservation stays consumed and the coins stay
/// charged; the error carries the application for manual follow-up.
pub struct AcceptApplicationHandler {
    queue: Arc<ApplicationQueue>,
    registry: Arc<NameRegistry>,
}

impl AcceptApplicationHandler {
    pub fn new(queue: Arc<ApplicationQueue>, registry: Arc<NameRegistry>) -> Self {
        Self { queue, registry }
    }

    pub async fn handle(
        &self,
        cmd: AcceptApplicationCommand,
    ) -> Result<AcceptApplicationResult, RegistryError> {
        let application = self
            .queue
            .take_by_id(cmd.id)
            .await?
            .ok_or_else(|| RegistryError::not_found_by_id(cmd.id))?;

        let record = NameRecord::enabled_now(application.owner, application.requested_name.clone());
        match self.registry.upsert_by_owner(&record).await {
            Ok(outcome) => {
                info!(
                    id = %application.id,
                    owner = %application.owner,
                    name = %application.requested_name,
                    ?outcome,
                    "application accepted"
                );
                Ok(AcceptApplicationResult {
                    application,
                    record,
                    outcome,
                })
            }
            Err(cause) => {
                error!(
                    id = %application.id,
                    owner = %application.owner,
                    error = %cause,
                    "application consumed but name not registered"
                );
                Err(RegistryError::reservation_consumed(application, cause))
            }
        }
    }
}
