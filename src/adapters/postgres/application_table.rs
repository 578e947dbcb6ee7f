//! PostgreSQL implementation of ApplicationTable.

use async_trait::async_trait;
use sqlx::PgPool;

use super::connection::store_error;
use crate::domain::foundation::{ApplicationId, OwnerId, StoreError, Timestamp};
use crate::domain::naming::{ApplicationRecord, NewApplication};
use crate::ports::ApplicationTable;

/// Accessor for `cjk_name_applications`.
pub struct PostgresApplicationTable {
    pool: PgPool,
}

impl PostgresApplicationTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an application.
#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: i64,
    owner_hi: i64,
    owner_lo: i64,
    name: String,
    reserved_coins: i64,
    created_at: i64,
}

impl From<ApplicationRow> for ApplicationRecord {
    fn from(row: ApplicationRow) -> Self {
        ApplicationRecord {
            id: ApplicationId::new(row.id),
            owner: OwnerId::from_halves(row.owner_hi, row.owner_lo),
            requested_name: row.name,
            reserved_coins: row.reserved_coins,
            created_at: Timestamp::from_millis(row.created_at),
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, owner_hi, owner_lo, name, reserved_coins, created_at FROM cjk_name_applications";

fn to_i64(value: u64, operation: &'static str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::query(operation, format!("{} out of range", value)))
}

#[async_trait]
impl ApplicationTable for PostgresApplicationTable {
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationId, StoreError> {
        let (hi, lo) = application.owner.halves();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cjk_name_applications (owner_hi, owner_lo, name, reserved_coins, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(hi)
        .bind(lo)
        .bind(&application.requested_name)
        .bind(application.reserved_coins)
        .bind(application.created_at.as_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("insert application", e))?;

        Ok(ApplicationId::new(id))
    }

    async fn query_by_id(&self, id: ApplicationId) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows: Vec<ApplicationRow> =
            sqlx::query_as(&format!("{} WHERE id = $1 LIMIT 2", SELECT_COLUMNS))
                .bind(id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_error("query application by id", e))?;

        Ok(rows.into_iter().map(ApplicationRecord::from).collect())
    }

    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<ApplicationRecord>, StoreError> {
        let (hi, lo) = owner.halves();
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "{} WHERE owner_hi = $1 AND owner_lo = $2 LIMIT 2",
            SELECT_COLUMNS
        ))
        .bind(hi)
        .bind(lo)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("query application by owner", e))?;

        Ok(rows.into_iter().map(ApplicationRecord::from).collect())
    }

    async fn query_by_name(&self, name: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows: Vec<ApplicationRow> =
            sqlx::query_as(&format!("{} WHERE name = $1 LIMIT 2", SELECT_COLUMNS))
                .bind(name)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_error("query application by name", e))?;

        Ok(rows.into_iter().map(ApplicationRecord::from).collect())
    }

    async fn query_page(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let offset = to_i64(offset, "query application page")?;
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "{} ORDER BY id LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("query application page", e))?;

        Ok(rows.into_iter().map(ApplicationRecord::from).collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cjk_name_applications")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("count applications", e))?;

        u64::try_from(count)
            .map_err(|_| StoreError::query("count applications", format!("negative count {}", count)))
    }

    async fn delete_by_id(&self, id: ApplicationId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cjk_name_applications WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete application", e))?;

        Ok(result.rows_affected())
    }

    /// No-op: the accessor holds no prepared statements of its own, and the
    /// pool belongs to the connection source.
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
