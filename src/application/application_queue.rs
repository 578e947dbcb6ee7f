//! ApplicationQueue - pending name reservations.
//!
//! A requested name has at most one open application, and an owner has at
//! most one open application. Reservations are consumed only through
//! `take_by_id` / `take_by_owner`, whose read-then-delete runs inside the
//! session critical section, so each is consumed exactly once.

use std::sync::Arc;

use tracing::{debug, info};

use super::name_checker::NameChecker;
use super::rows::{at_most_one, expect_one_affected, insert_error};
use super::session::{Session, SessionGuard, TableAccessor};
use crate::domain::foundation::{ApplicationId, OwnerId};
use crate::domain::naming::{self, ApplicationRecord, NewApplication, RegistryError};

/// Service over the applications table.
pub struct ApplicationQueue {
    session: Arc<Session>,
    names: Arc<dyn NameChecker>,
}

impl ApplicationQueue {
    pub fn new(session: Arc<Session>, names: Arc<dyn NameChecker>) -> Self {
        Self { session, names }
    }

    /// Validates the name pattern, then behaves as `add_no_check`.
    pub async fn add_with_check(
        &self,
        application: &NewApplication,
    ) -> Result<ApplicationId, RegistryError> {
        naming::check_name_valid(&application.requested_name)?;
        self.add_no_check(application).await
    }

    /// Inserts an application after the uniqueness checks, skipping the
    /// name pattern.
    ///
    /// # Errors
    ///
    /// - `AlreadyApplied` if the owner already has an open application
    /// - `NameRegistered` if the name is registered to anyone
    /// - `NameApplied` if the name already has an open application
    /// - `Store` on a store fault
    pub async fn add_no_check(
        &self,
        application: &NewApplication,
    ) -> Result<ApplicationId, RegistryError> {
        let mut guard = self.session.enter().await;
        let result = self.add_locked(&mut guard, application).await;
        guard.settle(&result).await;
        result
    }

    async fn add_locked(
        &self,
        guard: &mut SessionGuard<'_>,
        application: &NewApplication,
    ) -> Result<ApplicationId, RegistryError> {
        let tables = guard.acquire().await?;

        if let Some(existing) = find_by_owner(&tables, application.owner).await? {
            return Err(RegistryError::AlreadyApplied(existing));
        }
        if let Some(registered) = self
            .names
            .query_by_name(guard, &application.requested_name)
            .await?
        {
            return Err(RegistryError::NameRegistered(registered));
        }
        if let Some(existing) = find_by_name(&tables, &application.requested_name).await? {
            return Err(RegistryError::NameApplied(existing));
        }

        let id = tables
            .applications()
            .insert(application)
            .await
            .map_err(insert_error)?;
        info!(
            id = %id,
            owner = %application.owner,
            name = %application.requested_name,
            reserved_coins = application.reserved_coins,
            "application added"
        );
        Ok(id)
    }

    /// Removes and returns the owner's open application, if any.
    pub async fn take_by_owner(
        &self,
        owner: OwnerId,
    ) -> Result<Option<ApplicationRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                let found = find_by_owner(&tables, owner).await?;
                take(&tables, found).await
            })
            .await
    }

    /// Removes and returns the application with `id`, if any.
    pub async fn take_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                let rows = tables.applications().query_by_id(id).await?;
                let found = at_most_one(rows, &format!("application id {}", id))?;
                take(&tables, found).await
            })
            .await
    }

    pub async fn query_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ApplicationRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move { find_by_name(&tables, name).await })
            .await
    }

    pub async fn query_by_owner(
        &self,
        owner: OwnerId,
    ) -> Result<Option<ApplicationRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move { find_by_owner(&tables, owner).await })
            .await
    }

    /// Returns up to `limit` applications after skipping `offset`, by id.
    pub async fn query_with_page(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ApplicationRecord>, RegistryError> {
        self.session
            .with_tables(|tables| async move {
                let page = tables.applications().query_page(limit, offset).await?;
                debug!(limit, offset, returned = page.len(), "application page");
                Ok(page)
            })
            .await
    }

    /// Counts open applications.
    pub async fn query_count(&self) -> Result<u64, RegistryError> {
        self.session
            .with_tables(|tables| async move { Ok(tables.applications().count().await?) })
            .await
    }
}

async fn take(
    tables: &TableAccessor,
    found: Option<ApplicationRecord>,
) -> Result<Option<ApplicationRecord>, RegistryError> {
    let Some(application) = found else {
        return Ok(None);
    };
    let deleted = tables.applications().delete_by_id(application.id).await?;
    expect_one_affected(deleted, "application delete")?;
    debug!(id = %application.id, owner = %application.owner, "application taken");
    Ok(Some(application))
}

async fn find_by_owner(
    tables: &TableAccessor,
    owner: OwnerId,
) -> Result<Option<ApplicationRecord>, RegistryError> {
    let rows = tables.applications().query_by_owner(owner).await?;
    at_most_one(rows, &format!("application owner {}", owner))
}

async fn find_by_name(
    tables: &TableAccessor,
    name: &str,
) -> Result<Option<ApplicationRecord>, RegistryError> {
    let rows = tables.applications().query_by_name(name).await?;
    at_most_one(rows, &format!("application name {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConnectionSource;
    use crate::application::NameRegistry;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::naming::NameRecord;

    struct Fixture {
        source: Arc<InMemoryConnectionSource>,
        registry: Arc<NameRegistry>,
        queue: ApplicationQueue,
    }

    fn fixture() -> Fixture {
        let source = Arc::new(InMemoryConnectionSource::new());
        let session = Arc::new(Session::new(source.clone()));
        let registry = Arc::new(NameRegistry::new(session.clone()));
        let queue = ApplicationQueue::new(session, registry.clone());
        Fixture {
            source,
            registry,
            queue,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Adding
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn add_with_check_rejects_invalid_names_without_mutation() {
        let f = fixture();
        let owner = OwnerId::new();

        for name in ["ab", "爱", "爱爱爱爱爱", "爱a"] {
            let err = f
                .queue
                .add_with_check(&NewApplication::new(owner, name, 30))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidName);
        }
        assert_eq!(f.queue.query_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn add_no_check_skips_the_pattern_only() {
        let f = fixture();
        let owner = OwnerId::new();

        let id = f
            .queue
            .add_no_check(&NewApplication::new(owner, "Alice", 0))
            .await
            .unwrap();

        let stored = f.queue.query_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.requested_name, "Alice");
    }

    #[tokio::test]
    async fn owner_may_hold_only_one_application() {
        let f = fixture();
        let owner = OwnerId::new();
        let first = f
            .queue
            .add_with_check(&NewApplication::new(owner, "爱心", 30))
            .await
            .unwrap();

        let err = f
            .queue
            .add_with_check(&NewApplication::new(owner, "张三", 30))
            .await
            .unwrap_err();

        match err {
            RegistryError::AlreadyApplied(existing) => assert_eq!(existing.id, first),
            other => panic!("expected AlreadyApplied, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn registered_name_cannot_be_applied_for() {
        let f = fixture();
        let holder = NameRecord::enabled_now(OwnerId::new(), "爱心");
        f.registry.upsert_by_owner(&holder).await.unwrap();

        let err = f
            .queue
            .add_with_check(&NewApplication::new(holder.owner, "爱心", 30))
            .await
            .unwrap_err();

        assert_eq!(err, RegistryError::NameRegistered(holder));
    }

    #[tokio::test]
    async fn applied_name_cannot_be_applied_for_again() {
        let f = fixture();
        f.queue
            .add_with_check(&NewApplication::new(OwnerId::new(), "爱心", 30))
            .await
            .unwrap();

        let err = f
            .queue
            .add_with_check(&NewApplication::new(OwnerId::new(), "爱心", 30))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NameApplied);
        assert_eq!(f.queue.query_count().await.unwrap(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Taking
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn take_by_id_consumes_exactly_once() {
        let f = fixture();
        let id = f
            .queue
            .add_with_check(&NewApplication::new(OwnerId::new(), "爱心", 30))
            .await
            .unwrap();

        let taken = f.queue.take_by_id(id).await.unwrap();
        let again = f.queue.take_by_id(id).await.unwrap();

        assert_eq!(taken.map(|a| a.reserved_coins), Some(30));
        assert!(again.is_none());
        assert_eq!(f.queue.query_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn take_by_owner_returns_none_when_absent() {
        let f = fixture();
        assert!(f.queue.take_by_owner(OwnerId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_takes_consume_once() {
        let f = fixture();
        let owner = OwnerId::new();
        let id = f
            .queue
            .add_with_check(&NewApplication::new(owner, "爱心", 30))
            .await
            .unwrap();

        let (by_id, by_owner) = tokio::join!(f.queue.take_by_id(id), f.queue.take_by_owner(owner));

        let taken = [by_id.unwrap(), by_owner.unwrap()]
            .into_iter()
            .flatten()
            .count();
        assert_eq!(taken, 1);
    }

    #[tokio::test]
    async fn duplicate_owner_rows_are_an_internal_inconsistency() {
        let f = fixture();
        let owner = OwnerId::new();
        f.source
            .insert_application_unchecked(NewApplication::new(owner, "爱心", 0));
        f.source
            .insert_application_unchecked(NewApplication::new(owner, "张三", 0));

        let err = f.queue.take_by_owner(owner).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalInconsistency);
        assert_eq!(f.queue.query_count().await.unwrap(), 2);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Listing
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn query_with_page_walks_in_id_order() {
        let f = fixture();
        for name in ["一二", "三四", "五六", "七八", "九十"] {
            f.queue
                .add_with_check(&NewApplication::new(OwnerId::new(), name, 0))
                .await
                .unwrap();
        }

        let first = f.queue.query_with_page(4, 0).await.unwrap();
        let second = f.queue.query_with_page(4, 4).await.unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].requested_name, "九十");
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn query_by_name_finds_open_application() {
        let f = fixture();
        let owner = OwnerId::new();
        f.queue
            .add_with_check(&NewApplication::new(owner, "爱心", 0))
            .await
            .unwrap();

        let found = f.queue.query_by_name("爱心").await.unwrap().unwrap();
        assert_eq!(found.owner, owner);
        assert!(f.queue.query_by_name("张三").await.unwrap().is_none());
    }
}
