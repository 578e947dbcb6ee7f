//! Backing-store connection ports.
//!
//! A `ConnectionSource` hands out the live connection. When a connection is
//! reported broken the source replaces it and the replacement carries a new
//! `ConnectionEpoch`, which is how the session notices that its table
//! accessors are stale.
//!
//! # Design
//!
//! - **Single connection**: one live connection per source at a time
//! - **Idempotent schema**: opening a table issues CREATE TABLE IF NOT EXISTS
//! - **No retries**: a failed call surfaces as `StoreError`; the caller
//!   decides whether to report the connection broken

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ApplicationTable, NameTable};
use crate::domain::foundation::StoreError;

/// Identity of one underlying connection.
///
/// Strictly increases every time the source replaces its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionEpoch(u64);

impl ConnectionEpoch {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Returns the epoch that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ConnectionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch-{}", self.0)
    }
}

/// Port handing out the current store connection.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Returns the live connection, establishing a new one if the previous
    /// connection was reported broken or none exists yet.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if no connection can be established
    async fn current(&self) -> Result<Arc<dyn StoreConnection>, StoreError>;

    /// Reports that the connection with `epoch` faulted.
    ///
    /// Has no effect if that connection was already replaced.
    async fn report_failure(&self, epoch: ConnectionEpoch);
}

/// One live store connection able to open the managed tables.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    fn epoch(&self) -> ConnectionEpoch;

    /// Opens the names table, creating it if it does not exist.
    async fn open_name_table(&self) -> Result<Arc<dyn NameTable>, StoreError>;

    /// Opens the applications table, creating it if it does not exist.
    async fn open_application_table(&self) -> Result<Arc<dyn ApplicationTable>, StoreError>;
}
