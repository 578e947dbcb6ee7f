//! Session - owns the table accessors bound to the current store connection.
//!
//! The session mutex is the single critical section that enforces the
//! registry's uniqueness invariants. Every check-then-act sequence in
//! `NameRegistry` and `ApplicationQueue` runs while a `SessionGuard` is
//! held, which linearizes concurrent callers. The lock is not reentrant and
//! must never be held across a currency gateway call.
//!
//! Accessors are rebuilt lazily: `SessionGuard::acquire` compares the epoch
//! of the source's live connection with the epoch the accessors were opened
//! on, closes stale accessors, and opens fresh ones (creating the tables if
//! needed).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::domain::foundation::StoreError;
use crate::domain::naming::RegistryError;
use crate::ports::{ApplicationTable, ConnectionEpoch, ConnectionSource, NameTable};

/// Table accessors opened on one connection.
#[derive(Clone)]
pub struct TableAccessor {
    epoch: ConnectionEpoch,
    names: Arc<dyn NameTable>,
    applications: Arc<dyn ApplicationTable>,
}

impl TableAccessor {
    pub fn epoch(&self) -> ConnectionEpoch {
        self.epoch
    }

    pub fn names(&self) -> &dyn NameTable {
        self.names.as_ref()
    }

    pub fn applications(&self) -> &dyn ApplicationTable {
        self.applications.as_ref()
    }

    /// Closes both accessors, reporting the first failure.
    async fn close(&self) -> Result<(), StoreError> {
        let names = self.names.close().await;
        let applications = self.applications.close().await;
        names.and(applications)
    }
}

/// Owner of the connection-bound table accessors and of the critical section.
pub struct Session {
    source: Arc<dyn ConnectionSource>,
    bound: Mutex<Option<TableAccessor>>,
}

impl Session {
    pub fn new(source: Arc<dyn ConnectionSource>) -> Self {
        Self {
            source,
            bound: Mutex::new(None),
        }
    }

    /// Enters the critical section.
    pub async fn enter(&self) -> SessionGuard<'_> {
        SessionGuard {
            source: self.source.as_ref(),
            bound: self.bound.lock().await,
        }
    }

    /// Returns accessors bound to the live connection.
    ///
    /// The critical section is released before returning, so the accessor
    /// is only suitable for reads that need no linearization.
    pub async fn acquire(&self) -> Result<TableAccessor, StoreError> {
        self.enter().await.acquire().await
    }

    /// Runs `op` inside the critical section against live accessors.
    ///
    /// A store failure in the result invalidates the session before the
    /// lock is released.
    pub async fn with_tables<T, F, Fut>(&self, op: F) -> Result<T, RegistryError>
    where
        F: FnOnce(TableAccessor) -> Fut,
        Fut: Future<Output = Result<T, RegistryError>>,
    {
        let mut guard = self.enter().await;
        let result = match guard.acquire().await {
            Ok(tables) => op(tables).await,
            Err(e) => Err(e.into()),
        };
        guard.settle(&result).await;
        result
    }

    /// Closes the current accessors and forgets the connection.
    ///
    /// Idempotent. Close failures are logged, never returned.
    pub async fn teardown(&self) {
        let mut bound = self.bound.lock().await;
        if let Some(tables) = bound.take() {
            if let Err(e) = tables.close().await {
                warn!(epoch = %tables.epoch(), error = %e, "failed to close table accessors on teardown");
            }
            debug!(epoch = %tables.epoch(), "session torn down");
        }
    }
}

/// Proof that the session's critical section is held.
pub struct SessionGuard<'a> {
    source: &'a dyn ConnectionSource,
    bound: MutexGuard<'a, Option<TableAccessor>>,
}

impl SessionGuard<'_> {
    /// Returns accessors bound to the live connection, rebuilding them if
    /// the connection was replaced since they were opened.
    ///
    /// # Errors
    ///
    /// - `StoreError` if no connection is available or a table cannot be
    ///   opened; the connection is reported broken in the latter case
    pub async fn acquire(&mut self) -> Result<TableAccessor, StoreError> {
        let connection = self.source.current().await?;
        let epoch = connection.epoch();

        if let Some(tables) = self.bound.as_ref() {
            if tables.epoch == epoch {
                return Ok(tables.clone());
            }
        }

        if let Some(stale) = self.bound.take() {
            if let Err(e) = stale.close().await {
                warn!(epoch = %stale.epoch, error = %e, "failed to close stale table accessors");
            }
        }

        let opened = async {
            let names = connection.open_name_table().await?;
            let applications = match connection.open_application_table().await {
                Ok(applications) => applications,
                Err(e) => {
                    if let Err(close_err) = names.close().await {
                        warn!(epoch = %epoch, error = %close_err, "failed to close partially opened table accessors");
                    }
                    return Err(e);
                }
            };
            Ok::<_, StoreError>(TableAccessor {
                epoch,
                names,
                applications,
            })
        }
        .await;

        match opened {
            Ok(tables) => {
                debug!(epoch = %epoch, "session bound to connection");
                *self.bound = Some(tables.clone());
                Ok(tables)
            }
            Err(e) => {
                self.source.report_failure(epoch).await;
                Err(e)
            }
        }
    }

    /// Returns the accessors opened by the last `acquire`, if any.
    pub fn tables(&self) -> Option<&TableAccessor> {
        self.bound.as_ref()
    }

    /// Drops the current accessors and reports their connection broken so
    /// the next `acquire` rebuilds on a fresh one.
    pub async fn invalidate(&mut self) {
        if let Some(stale) = self.bound.take() {
            if let Err(e) = stale.close().await {
                warn!(epoch = %stale.epoch, error = %e, "failed to close invalidated table accessors");
            }
            warn!(epoch = %stale.epoch, "session invalidated after store failure");
            self.source.report_failure(stale.epoch).await;
        }
    }

    /// Invalidates the session if `result` carries a store failure.
    pub async fn settle<T>(&mut self, result: &Result<T, RegistryError>) {
        if let Err(e) = result {
            if e.is_store_failure() {
                self.invalidate().await;
            }
        }
    }
}
