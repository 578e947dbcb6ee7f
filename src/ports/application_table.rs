//! Applications table port.
//!
//! Row-level access to pending applications over one connection.

use async_trait::async_trait;

use crate::domain::foundation::{ApplicationId, OwnerId, StoreError};
use crate::domain::naming::{ApplicationRecord, NewApplication};

/// Accessor for the applications table bound to one connection.
#[async_trait]
pub trait ApplicationTable: Send + Sync {
    /// Inserts a row and returns the id generated by the store.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` if the requested name already has a row
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationId, StoreError>;

    /// Returns every row with `id`.
    async fn query_by_id(&self, id: ApplicationId) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Returns every row owned by `owner`.
    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Returns every row requesting `name`.
    async fn query_by_name(&self, name: &str) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Returns up to `limit` rows after skipping `offset`, ordered by id.
    async fn query_page(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Counts all rows.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Deletes the row with `id`, returning the number of rows deleted.
    async fn delete_by_id(&self, id: ApplicationId) -> Result<u64, StoreError>;

    /// Releases resources held by this accessor.
    async fn close(&self) -> Result<(), StoreError>;
}
