//! PostgreSQL connection source.
//!
//! The registry shares one connection: the pool is capped at a single
//! connection and is replaced as a whole when a store failure is reported.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::application_table::PostgresApplicationTable;
use super::name_table::PostgresNameTable;
use crate::config::DatabaseConfig;
use crate::domain::foundation::StoreError;
use crate::ports::{
    ApplicationTable, ConnectionEpoch, ConnectionSource, NameTable, StoreConnection,
};

pub(super) const CREATE_NAMES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cjk_names (
        owner_hi    BIGINT  NOT NULL,
        owner_lo    BIGINT  NOT NULL,
        name        TEXT    NOT NULL UNIQUE,
        modified_at BIGINT  NOT NULL,
        enabled     BOOLEAN NOT NULL,
        PRIMARY KEY (owner_hi, owner_lo)
    )
"#;

pub(super) const CREATE_APPLICATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cjk_name_applications (
        id             BIGSERIAL PRIMARY KEY,
        owner_hi       BIGINT NOT NULL,
        owner_lo       BIGINT NOT NULL,
        name           TEXT   NOT NULL UNIQUE,
        reserved_coins BIGINT NOT NULL DEFAULT 0,
        created_at     BIGINT NOT NULL
    )
"#;

/// Maps a sqlx failure to the store taxonomy.
pub(super) fn store_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::unique_violation(db_err.constraint().unwrap_or("unique").to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::unavailable(format!("{}: {}", operation, err))
        }
        other => StoreError::query(operation, other.to_string()),
    }
}

struct LiveConnection {
    epoch: ConnectionEpoch,
    pool: PgPool,
}

/// PostgreSQL implementation of the `ConnectionSource` port.
///
/// Connects lazily on first use and again after `report_failure`.
pub struct PostgresConnectionSource {
    config: DatabaseConfig,
    state: Mutex<SourceState>,
}

struct SourceState {
    last_epoch: ConnectionEpoch,
    live: Option<LiveConnection>,
}

impl PostgresConnectionSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SourceState {
                last_epoch: ConnectionEpoch::new(0),
                live: None,
            }),
        }
    }

    fn connect(&self) -> Result<PgPool, StoreError> {
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.config.acquire_timeout())
            .connect_lazy(&self.config.url)
            .map_err(|e| StoreError::unavailable(format!("invalid database url: {}", e)))
    }

    /// Closes the live connection, if any.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Some(live) = state.live.take() {
            live.pool.close().await;
            info!(epoch = %live.epoch, "database connection closed");
        }
    }
}

#[async_trait]
impl ConnectionSource for PostgresConnectionSource {
    async fn current(&self) -> Result<Arc<dyn StoreConnection>, StoreError> {
        let mut state = self.state.lock().await;
        if let Some(live) = state.live.as_ref() {
            return Ok(Arc::new(PostgresConnection {
                epoch: live.epoch,
                pool: live.pool.clone(),
                create_tables: self.config.run_migrations,
            }));
        }

        let pool = self.connect()?;
        let epoch = state.last_epoch.next();
        state.last_epoch = epoch;
        state.live = Some(LiveConnection {
            epoch,
            pool: pool.clone(),
        });
        info!(epoch = %epoch, "database connection opened");

        Ok(Arc::new(PostgresConnection {
            epoch,
            pool,
            create_tables: self.config.run_migrations,
        }))
    }

    async fn report_failure(&self, epoch: ConnectionEpoch) {
        let mut state = self.state.lock().await;
        let failed = matches!(state.live.as_ref(), Some(live) if live.epoch == epoch);
        if !failed {
            return;
        }
        if let Some(live) = state.live.take() {
            warn!(epoch = %epoch, "dropping failed database connection");
            live.pool.close().await;
        }
    }
}

struct PostgresConnection {
    epoch: ConnectionEpoch,
    pool: PgPool,
    create_tables: bool,
}

impl PostgresConnection {
    async fn ensure(&self, ddl: &str, operation: &'static str) -> Result<(), StoreError> {
        if self.create_tables {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| store_error(operation, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for PostgresConnection {
    fn epoch(&self) -> ConnectionEpoch {
        self.epoch
    }

    async fn open_name_table(&self) -> Result<Arc<dyn NameTable>, StoreError> {
        self.ensure(CREATE_NAMES_TABLE, "create names table").await?;
        Ok(Arc::new(PostgresNameTable::new(self.pool.clone())))
    }

    async fn open_application_table(&self) -> Result<Arc<dyn ApplicationTable>, StoreError> {
        self.ensure(CREATE_APPLICATIONS_TABLE, "create applications table")
            .await?;
        Ok(Arc::new(PostgresApplicationTable::new(self.pool.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn pool_errors_are_unavailable() {
        let err = store_error("count applications", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn other_errors_keep_the_operation() {
        let err = store_error("count applications", sqlx::Error::RowNotFound);
        match err {
            StoreError::Query { operation, .. } => assert_eq!(operation, "count applications"),
            other => panic!("expected Query, got {:?}", other),
        }
    }

    #[test]
    fn ddl_declares_backstop_constraints() {
        assert!(CREATE_NAMES_TABLE.contains("name        TEXT    NOT NULL UNIQUE"));
        assert!(CREATE_APPLICATIONS_TABLE.contains("BIGSERIAL PRIMARY KEY"));
        assert!(CREATE_APPLICATIONS_TABLE.contains("NOT NULL UNIQUE"));
    }

    #[tokio::test]
    async fn connection_is_lazy_and_epoch_advances_after_failure() {
        let source = PostgresConnectionSource::new(config("postgres://localhost:1/names"));

        let first = source.current().await.unwrap();
        let again = source.current().await.unwrap();
        assert_eq!(first.epoch(), again.epoch());

        source.report_failure(first.epoch()).await;
        let second = source.current().await.unwrap();
        assert!(second.epoch() > first.epoch());
    }

    #[tokio::test]
    async fn stale_failure_report_is_ignored() {
        let source = PostgresConnectionSource::new(config("postgres://localhost:1/names"));
        let first = source.current().await.unwrap();
        source.report_failure(first.epoch()).await;
        let second = source.current().await.unwrap();

        source.report_failure(first.epoch()).await;

        assert_eq!(source.current().await.unwrap().epoch(), second.epoch());
    }

    #[tokio::test]
    async fn malformed_url_is_unavailable() {
        let source = PostgresConnectionSource::new(config("not a url"));
        let err = source.current().await.err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
