//! SetNameHandler - Administrative command that writes a name directly.

use std::sync::Arc;

use tracing::info;

use crate::application::NameRegistry;
use crate::domain::foundation::OwnerId;
use crate::domain::naming::{NameRecord, RegistryError, UpsertOutcome};

/// Command to set an owner's name, bypassing the application queue.
#[derive(Debug, Clone)]
pub struct SetNameCommand {
    pub owner: OwnerId,
    pub name: String,
}

/// Result of an administrative set.
#[derive(Debug, Clone)]
pub struct SetNameResult {
    pub record: NameRecord,
    pub outcome: UpsertOutcome,
}

/// Handler for administrative name changes.
///
/// The name pattern is not checked and the record is always enabled.
/// Uniqueness against other owners still applies.
pub struct SetNameHandler {
    registry: Arc<NameRegistry>,
}

impl SetNameHandler {
    pub fn new(registry: Arc<NameRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, cmd: SetNameCommand) -> Result<SetNameResult, RegistryError> {
        let record = NameRecord::enabled_now(cmd.owner, cmd.name);
        let outcome = self.registry.upsert_by_owner(&record).await?;
        info!(owner = %record.owner, name = %record.name, ?outcome, "name set by administrator");
        Ok(SetNameResult { record, outcome })
    }
}
