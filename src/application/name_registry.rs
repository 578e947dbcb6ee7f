//! NameRegistry - the table of registered names.
//!
//! One name maps to one owner and each owner holds at most one name. Both
//! rules are enforced by running every lookup-then-write inside the session
//! critical section; the store's unique constraint only backs that up.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::name_checker::NameChecker;
use super::rows::{at_most_one, expect_one_affected, insert_error};
use super::session::{Session, SessionGuard, TableAccessor};
use crate::domain::foundation::{OwnerId, Timestamp};
use crate::domain::naming::{self, NameRecord, RegistryError, UpsertOutcome};

/// Service over the names table.
pub struct NameRegistry {
    session: Arc<Session>,
}

impl NameRegistry {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Fails with `InvalidName` unless `name` is 2 to 4 CJK ideographs.
    pub fn check_name_valid(&self, name: &str) -> Result<(), RegistryError> {
        naming::check_name_valid(name)
    }

    pub async fn query_by_name(&self, name: &str) -> Result<Option<NameRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move { find_by_name(&tables, name).await })
            .await
    }

    pub async fn query_by_owner(&self, owner: OwnerId) -> Result<Option<NameRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move { find_by_owner(&tables, owner).await })
            .await
    }

    /// Writes `record` as the owner's name, creating the row if needed.
    ///
    /// # Errors
    ///
    /// - `NameRegistered` if another owner holds the name
    /// - `InternalInconsistency` on unexpected row counts
    /// - `Store` on a store fault
    pub async fn upsert_by_owner(&self, record: &NameRecord) -> Result<UpsertOutcome, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                if let Some(existing) = find_by_name(&tables, &record.name).await? {
                    if existing.owner != record.owner {
                        return Err(RegistryError::NameRegistered(existing));
                    }
                }

                let outcome = match tables.names().update_by_owner(record).await? {
                    0 => {
                        let inserted = tables.names().insert(record).await.map_err(insert_error)?;
                        expect_one_affected(inserted, "name insert")?;
                        UpsertOutcome::Created
                    }
                    1 => UpsertOutcome::Updated,
                    n => {
                        return Err(RegistryError::inconsistency(format!(
                            "name update for owner {} affected {} rows",
                            record.owner, n
                        )))
                    }
                };

                info!(owner = %record.owner, name = %record.name, ?outcome, "name registered");
                Ok(outcome)
            })
            .await
    }

    /// Enables or disables the owner's name. Returns false if the owner has
    /// no name.
    pub async fn set_enabled(&self, owner: OwnerId, enabled: bool) -> Result<bool, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                let updated = tables
                    .names()
                    .set_enabled(owner, enabled, Timestamp::now())
                    .await?;
                match updated {
                    0 => Ok(false),
                    1 => {
                        info!(owner = %owner, enabled, "name toggled");
                        Ok(true)
                    }
                    n => Err(RegistryError::inconsistency(format!(
                        "name toggle for owner {} affected {} rows",
                        owner, n
                    ))),
                }
            })
            .await
    }

    /// Deletes the owner's name. Idempotent; returns whether a row existed.
    pub async fn remove_by_owner(&self, owner: OwnerId) -> Result<bool, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                match tables.names().delete_by_owner(owner).await? {
                    0 => Ok(false),
                    1 => {
                        info!(owner = %owner, "name removed");
                        Ok(true)
                    }
                    n => Err(RegistryError::inconsistency(format!(
                        "name delete for owner {} affected {} rows",
                        owner, n
                    ))),
                }
            })
            .await
    }
}

#[async_trait]
impl NameChecker for NameRegistry {
    async fn query_by_name(
        &self,
        guard: &SessionGuard<'_>,
        name: &str,
    ) -> Result<Option<NameRecord>, RegistryError> {
        let tables = guard
            .tables()
            .ok_or_else(|| RegistryError::inconsistency("name check issued before acquire"))?;
        find_by_name(tables, name).await
    }
}

async fn find_by_name(tables: &TableAccessor, name: &str) -> Result<Option<NameRecord>, RegistryError> {
    let rows = tables.names().query_by_name(name).await?;
    debug!(name, matched = rows.len(), "name lookup");
    at_most_one(rows, &format!("name {}", name))
}

async fn find_by_owner(
    tables: &TableAccessor,
    owner: OwnerId,
) -> Result<Option<NameRecord>, RegistryError> {
    let rows = tables.names().query_by_owner(owner).await?;
    debug!(owner = %owner, matched = rows.len(), "name lookup by owner");
    at_most_one(rows, &format!("owner {}", owner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConnectionSource;
    use crate::domain::foundation::ErrorCode;

    fn registry() -> (Arc<InMemoryConnectionSource>, NameRegistry) {
        let source = Arc::new(InMemoryConnectionSource::new());
        let session = Arc::new(Session::new(source.clone()));
        (source, NameRegistry::new(session))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Upsert
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let (_, registry) = registry();
        let owner = OwnerId::new();

        let first = registry
            .upsert_by_owner(&NameRecord::enabled_now(owner, "张三"))
            .await
            .unwrap();
        let second = registry
            .upsert_by_owner(&NameRecord::enabled_now(owner, "李四"))
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        let stored = registry.query_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.name, "李四");
        assert!(registry.query_by_name("张三").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_same_name_for_same_owner_is_an_update() {
        let (_, registry) = registry();
        let owner = OwnerId::new();
        let record = NameRecord::enabled_now(owner, "张三");

        registry.upsert_by_owner(&record).await.unwrap();
        let outcome = registry.upsert_by_owner(&record).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
    }

    #[tokio::test]
    async fn upsert_rejects_name_held_by_another_owner() {
        let (_, registry) = registry();
        let holder = NameRecord::enabled_now(OwnerId::new(), "张三");
        registry.upsert_by_owner(&holder).await.unwrap();

        let err = registry
            .upsert_by_owner(&NameRecord::enabled_now(OwnerId::new(), "张三"))
            .await
            .unwrap_err();

        assert_eq!(err, RegistryError::NameRegistered(holder));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Lookups
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn duplicate_rows_are_an_internal_inconsistency() {
        let (source, registry) = registry();
        source.insert_name_unchecked(NameRecord::enabled_now(OwnerId::new(), "张三"));
        source.insert_name_unchecked(NameRecord::enabled_now(OwnerId::new(), "张三"));

        let err = registry.query_by_name("张三").await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalInconsistency);
    }

    #[tokio::test]
    async fn store_failure_surfaces_and_next_call_recovers() {
        let (source, registry) = registry();
        let owner = OwnerId::new();
        registry
            .upsert_by_owner(&NameRecord::enabled_now(owner, "张三"))
            .await
            .unwrap();

        source.fail_next_queries(1);
        let err = registry.query_by_owner(owner).await.unwrap_err();
        assert!(err.is_store_failure());

        let found = registry.query_by_owner(owner).await.unwrap();
        assert_eq!(found.map(|r| r.name), Some("张三".to_string()));
    }

    #[test]
    fn check_name_valid_delegates_to_pattern() {
        let (_, registry) = registry();
        assert!(registry.check_name_valid("爱心").is_ok());
        assert!(registry.check_name_valid("ab").is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Toggle and removal
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn set_enabled_reports_missing_owner() {
        let (_, registry) = registry();
        let owner = OwnerId::new();

        assert!(!registry.set_enabled(owner, false).await.unwrap());

        registry
            .upsert_by_owner(&NameRecord::enabled_now(owner, "张三"))
            .await
            .unwrap();
        assert!(registry.set_enabled(owner, false).await.unwrap());
        assert!(!registry.query_by_owner(owner).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn remove_by_owner_is_idempotent() {
        let (_, registry) = registry();
        let owner = OwnerId::new();
        registry
            .upsert_by_owner(&NameRecord::enabled_now(owner, "张三"))
            .await
            .unwrap();

        assert!(registry.remove_by_owner(owner).await.unwrap());
        assert!(!registry.remove_by_owner(owner).await.unwrap());
        assert!(registry.query_by_owner(owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_check_requires_acquired_guard() {
        let source = Arc::new(InMemoryConnectionSource::new());
        let session = Arc::new(Session::new(source));
        let registry = NameRegistry::new(session.clone());

        let guard = session.enter().await;
        let err = NameChecker::query_by_name(&registry, &guard, "张三")
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalInconsistency);
    }
}
