//! Names table port.
//!
//! Row-level access to registered names over one connection. The table
//! reports raw row counts and returns every matching row; enforcing
//! uniqueness and interpreting counts is the registry's job.

use async_trait::async_trait;

use crate::domain::foundation::{OwnerId, StoreError, Timestamp};
use crate::domain::naming::NameRecord;

/// Accessor for the names table bound to one connection.
#[async_trait]
pub trait NameTable: Send + Sync {
    /// Returns every row whose name equals `name`.
    async fn query_by_name(&self, name: &str) -> Result<Vec<NameRecord>, StoreError>;

    /// Returns every row owned by `owner`.
    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<NameRecord>, StoreError>;

    /// Inserts a row, returning the number of rows inserted.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` if the name already exists
    async fn insert(&self, record: &NameRecord) -> Result<u64, StoreError>;

    /// Overwrites name, timestamp and flag of the row owned by
    /// `record.owner`, returning the number of rows updated.
    async fn update_by_owner(&self, record: &NameRecord) -> Result<u64, StoreError>;

    /// Sets the enabled flag of the row owned by `owner`, returning the
    /// number of rows updated.
    async fn set_enabled(
        &self,
        owner: OwnerId,
        enabled: bool,
        modified_at: Timestamp,
    ) -> Result<u64, StoreError>;

    /// Deletes the row owned by `owner`, returning the number of rows deleted.
    async fn delete_by_owner(&self, owner: OwnerId) -> Result<u64, StoreError>;

    /// Releases resources held by this accessor.
    async fn close(&self) -> Result<(), StoreError>;
}
