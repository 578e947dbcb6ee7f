//! In-memory store implementation.
//!
//! This adapter provides an in-memory implementation of the store ports.
//! Useful for:
//! - Development and testing environments
//! - Exercising reconnection and store-failure paths deterministically
//!
//! The data outlives individual connections: `reconnect` and
//! `report_failure` replace the connection (bumping its epoch) but keep the
//! rows, the way a database server outlives a dropped socket. Accessors
//! opened on a replaced connection fail with `Unavailable`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::{ApplicationId, OwnerId, StoreError, Timestamp};
use crate::domain::naming::{ApplicationRecord, NameRecord, NewApplication};
use crate::ports::{
    ApplicationTable, ConnectionEpoch, ConnectionSource, NameTable, StoreConnection,
};

const NAME_UNIQUE_CONSTRAINT: &str = "cjk_names_name_key";
const APPLICATION_NAME_UNIQUE_CONSTRAINT: &str = "cjk_name_applications_name_key";

/// Counters describing accessor lifecycle, for tests and debugging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub tables_opened: u64,
    pub tables_closed: u64,
    pub epoch: u64,
}

#[derive(Default)]
struct MemoryDatabase {
    names: Vec<NameRecord>,
    applications: BTreeMap<i64, ApplicationRecord>,
    last_application_id: i64,
}

impl MemoryDatabase {
    fn insert_application(&mut self, application: &NewApplication) -> ApplicationId {
        self.last_application_id += 1;
        let id = ApplicationId::new(self.last_application_id);
        self.applications
            .insert(id.get(), application.clone().into_record(id));
        id
    }
}

struct Shared {
    db: Mutex<MemoryDatabase>,
    epoch: AtomicU64,
    available: AtomicBool,
    failing_queries: AtomicU32,
    failing_closes: AtomicU32,
    failing_application_opens: AtomicU32,
    tables_opened: AtomicU64,
    tables_closed: AtomicU64,
}

impl Shared {
    fn db(&self) -> MutexGuard<'_, MemoryDatabase> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_epoch(&self) -> ConnectionEpoch {
        ConnectionEpoch::new(self.epoch.load(Ordering::SeqCst))
    }

    /// Consumes one injected failure if any are pending.
    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Fails the call if the accessor's connection was replaced or a
    /// failure was injected.
    fn check(&self, epoch: ConnectionEpoch, operation: &'static str) -> Result<(), StoreError> {
        if self.current_epoch() != epoch {
            return Err(StoreError::unavailable(format!(
                "{} issued on replaced connection {}",
                operation, epoch
            )));
        }
        if Self::take_failure(&self.failing_queries) {
            return Err(StoreError::query(operation, "injected failure"));
        }
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        if Self::take_failure(&self.failing_closes) {
            return Err(StoreError::query("close table", "injected failure"));
        }
        self.tables_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory implementation of the `ConnectionSource` port.
///
/// Thread-safe via internal `Mutex`. Does not persist data across restarts.
#[derive(Clone)]
pub struct InMemoryConnectionSource {
    shared: Arc<Shared>,
}

impl Default for InMemoryConnectionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionSource {
    /// Creates an empty store whose first connection has epoch 1.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                db: Mutex::new(MemoryDatabase::default()),
                epoch: AtomicU64::new(1),
                available: AtomicBool::new(true),
                failing_queries: AtomicU32::new(0),
                failing_closes: AtomicU32::new(0),
                failing_application_opens: AtomicU32::new(0),
                tables_opened: AtomicU64::new(0),
                tables_closed: AtomicU64::new(0),
            }),
        }
    }

    /// Replaces the live connection, as a reconnect after a timeout would.
    pub fn reconnect(&self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes `current` fail with `Unavailable` while `false`.
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }

    /// Makes the next `n` table operations fail with a query error.
    pub fn fail_next_queries(&self, n: u32) {
        self.shared.failing_queries.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` accessor closes fail.
    pub fn fail_next_closes(&self, n: u32) {
        self.shared.failing_closes.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` application table opens fail, after the name
    /// table has been opened.
    pub fn fail_next_application_table_opens(&self, n: u32) {
        self.shared.failing_application_opens.store(n, Ordering::SeqCst);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            tables_opened: self.shared.tables_opened.load(Ordering::SeqCst),
            tables_closed: self.shared.tables_closed.load(Ordering::SeqCst),
            epoch: self.shared.epoch.load(Ordering::SeqCst),
        }
    }

    /// Inserts a name row without the unique-name backstop.
    ///
    /// Simulates legacy data that predates the constraint.
    pub fn insert_name_unchecked(&self, record: NameRecord) {
        self.shared.db().names.push(record);
    }

    /// Inserts an application row without the unique-name backstop.
    pub fn insert_application_unchecked(&self, application: NewApplication) -> ApplicationId {
        self.shared.db().insert_application(&application)
    }

    /// Deletes an application row outside any session, as a concurrent
    /// writer would. Returns whether the row existed.
    pub fn remove_application_unchecked(&self, id: ApplicationId) -> bool {
        self.shared.db().applications.remove(&id.get()).is_some()
    }

    /// Returns a copy of every stored application, ordered by id.
    pub fn applications(&self) -> Vec<ApplicationRecord> {
        self.shared.db().applications.values().cloned().collect()
    }

    /// Returns a copy of every stored name.
    pub fn names(&self) -> Vec<NameRecord> {
        self.shared.db().names.clone()
    }
}

#[async_trait]
impl ConnectionSource for InMemoryConnectionSource {
    async fn current(&self) -> Result<Arc<dyn StoreConnection>, StoreError> {
        if !self.shared.available.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store is offline"));
        }
        Ok(Arc::new(InMemoryConnection {
            epoch: self.shared.current_epoch(),
            shared: self.shared.clone(),
        }))
    }

    async fn report_failure(&self, epoch: ConnectionEpoch) {
        // Only the connection that failed is replaced.
        let _ = self.shared.epoch.compare_exchange(
            epoch.get(),
            epoch.next().get(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

struct InMemoryConnection {
    epoch: ConnectionEpoch,
    shared: Arc<Shared>,
}

#[async_trait]
impl StoreConnection for InMemoryConnection {
    fn epoch(&self) -> ConnectionEpoch {
        self.epoch
    }

    async fn open_name_table(&self) -> Result<Arc<dyn NameTable>, StoreError> {
        self.shared.check(self.epoch, "create names table")?;
        self.shared.tables_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryNameTable {
            epoch: self.epoch,
            shared: self.shared.clone(),
        }))
    }

    async fn open_application_table(&self) -> Result<Arc<dyn ApplicationTable>, StoreError> {
        self.shared.check(self.epoch, "create applications table")?;
        if Shared::take_failure(&self.shared.failing_application_opens) {
            return Err(StoreError::query("create applications table", "injected failure"));
        }
        self.shared.tables_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryApplicationTable {
            epoch: self.epoch,
            shared: self.shared.clone(),
        }))
    }
}

struct InMemoryNameTable {
    epoch: ConnectionEpoch,
    shared: Arc<Shared>,
}

#[async_trait]
impl NameTable for InMemoryNameTable {
    async fn query_by_name(&self, name: &str) -> Result<Vec<NameRecord>, StoreError> {
        self.shared.check(self.epoch, "query name by name")?;
        let db = self.shared.db();
        Ok(db.names.iter().filter(|r| r.name == name).cloned().collect())
    }

    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<NameRecord>, StoreError> {
        self.shared.check(self.epoch, "query name by owner")?;
        let db = self.shared.db();
        Ok(db.names.iter().filter(|r| r.owner == owner).cloned().collect())
    }

    async fn insert(&self, record: &NameRecord) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "insert name")?;
        let mut db = self.shared.db();
        if db.names.iter().any(|r| r.name == record.name) {
            return Err(StoreError::unique_violation(NAME_UNIQUE_CONSTRAINT));
        }
        db.names.push(record.clone());
        Ok(1)
    }

    async fn update_by_owner(&self, record: &NameRecord) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "update name")?;
        let mut db = self.shared.db();
        if db
            .names
            .iter()
            .any(|r| r.name == record.name && r.owner != record.owner)
        {
            return Err(StoreError::unique_violation(NAME_UNIQUE_CONSTRAINT));
        }
        let mut updated = 0;
        for row in db.names.iter_mut().filter(|r| r.owner == record.owner) {
            row.name = record.name.clone();
            row.last_modified = record.last_modified;
            row.enabled = record.enabled;
            updated += 1;
        }
        Ok(updated)
    }

    async fn set_enabled(
        &self,
        owner: OwnerId,
        enabled: bool,
        modified_at: Timestamp,
    ) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "toggle name")?;
        let mut db = self.shared.db();
        let mut updated = 0;
        for row in db.names.iter_mut().filter(|r| r.owner == owner) {
            row.enabled = enabled;
            row.last_modified = modified_at;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_by_owner(&self, owner: OwnerId) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "delete name")?;
        let mut db = self.shared.db();
        let before = db.names.len();
        db.names.retain(|r| r.owner != owner);
        Ok((before - db.names.len()) as u64)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.shared.close()
    }
}

struct InMemoryApplicationTable {
    epoch: ConnectionEpoch,
    shared: Arc<Shared>,
}

impl InMemoryApplicationTable {
    fn filtered(&self, keep: impl Fn(&ApplicationRecord) -> bool) -> Vec<ApplicationRecord> {
        let db = self.shared.db();
        db.applications.values().filter(|a| keep(a)).cloned().collect()
    }
}

#[async_trait]
impl ApplicationTable for InMemoryApplicationTable {
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationId, StoreError> {
        self.shared.check(self.epoch, "insert application")?;
        let mut db = self.shared.db();
        if db
            .applications
            .values()
            .any(|a| a.requested_name == application.requested_name)
        {
            return Err(StoreError::unique_violation(
                APPLICATION_NAME_UNIQUE_CONSTRAINT,
            ));
        }
        Ok(db.insert_application(application))
    }

    async fn query_by_id(&self, id: ApplicationId) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.shared.check(self.epoch, "query application by id")?;
        Ok(self.filtered(|a| a.id == id))
    }

    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.shared.check(self.epoch, "query application by owner")?;
        Ok(self.filtered(|a| a.owner == owner))
    }

    async fn query_by_name(&self, name: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.shared.check(self.epoch, "query application by name")?;
        Ok(self.filtered(|a| a.requested_name == name))
    }

    async fn query_page(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.shared.check(self.epoch, "query application page")?;
        let db = self.shared.db();
        Ok(db
            .applications
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "count applications")?;
        Ok(self.shared.db().applications.len() as u64)
    }

    async fn delete_by_id(&self, id: ApplicationId) -> Result<u64, StoreError> {
        self.shared.check(self.epoch, "delete application")?;
        let removed = self.shared.db().applications.remove(&id.get());
        Ok(u64::from(removed.is_some()))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.shared.close()
    }
}
