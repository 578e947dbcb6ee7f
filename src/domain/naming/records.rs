//! Persistent records of the registry and the application queue.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ApplicationId, OwnerId, Timestamp};

/// The canonical, currently-registered name for an owner.
///
/// `name` is unique across all records and each owner has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub owner: OwnerId,
    pub name: String,
    pub last_modified: Timestamp,
    /// Whether the name is currently in effect for display purposes.
    pub enabled: bool,
}

impl NameRecord {
    /// Creates an enabled record stamped with the current time.
    pub fn enabled_now(owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            last_modified: Timestamp::now(),
            enabled: true,
        }
    }
}

/// A pending request to claim a name, with any currency held against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub owner: OwnerId,
    pub requested_name: String,
    pub reserved_coins: i64,
    pub created_at: Timestamp,
}

impl ApplicationRecord {
    /// Returns the insertable form of this record, dropping the store id.
    ///
    /// Used to restore a reservation after a failed refund.
    pub fn to_new(&self) -> NewApplication {
        NewApplication {
            owner: self.owner,
            requested_name: self.requested_name.clone(),
            reserved_coins: self.reserved_coins,
            created_at: self.created_at,
        }
    }
}

/// An application that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub owner: OwnerId,
    pub requested_name: String,
    pub reserved_coins: i64,
    pub created_at: Timestamp,
}

impl NewApplication {
    pub fn new(owner: OwnerId, requested_name: impl Into<String>, reserved_coins: i64) -> Self {
        Self {
            owner,
            requested_name: requested_name.into(),
            reserved_coins,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches the id assigned by the store.
    pub fn into_record(self, id: ApplicationId) -> ApplicationRecord {
        ApplicationRecord {
            id,
            owner: self.owner,
            requested_name: self.requested_name,
            reserved_coins: self.reserved_coins,
            created_at: self.created_at,
        }
    }
}

/// Result of writing a record keyed by owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}
