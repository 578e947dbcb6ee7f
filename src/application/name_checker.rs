//! NameChecker - the queue's narrow view of the registry.

use async_trait::async_trait;

use super::session::SessionGuard;
use crate::domain::naming::{NameRecord, RegistryError};

/// Read-only name lookup performed inside a critical section the caller
/// already holds.
///
/// Implementations must use the accessors of `guard` and never lock the
/// session again.
#[async_trait]
pub trait NameChecker: Send + Sync {
    /// Returns the record registered under `name`, if any.
    ///
    /// # Errors
    ///
    /// - `InternalInconsistency` if `guard` holds no accessors or the name
    ///   matches more than one record
    /// - `Store` on a store fault
    async fn query_by_name(
        &self,
        guard: &SessionGuard<'_>,
        name: &str,
    ) -> Result<Option<NameRecord>, RegistryError>;
}
