//! PostgreSQL implementation of NameTable.

use async_trait::async_trait;
use sqlx::PgPool;

use super::connection::store_error;
use crate::domain::foundation::{OwnerId, StoreError, Timestamp};
use crate::domain::naming::NameRecord;
use crate::ports::NameTable;

/// Accessor for `cjk_names`.
pub struct PostgresNameTable {
    pool: PgPool,
}

impl PostgresNameTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a registered name.
#[derive(Debug, sqlx::FromRow)]
struct NameRow {
    owner_hi: i64,
    owner_lo: i64,
    name: String,
    modified_at: i64,
    enabled: bool,
}

impl From<NameRow> for NameRecord {
    fn from(row: NameRow) -> Self {
        NameRecord {
            owner: OwnerId::from_halves(row.owner_hi, row.owner_lo),
            name: row.name,
            last_modified: Timestamp::from_millis(row.modified_at),
            enabled: row.enabled,
        }
    }
}

#[async_trait]
impl NameTable for PostgresNameTable {
    async fn query_by_name(&self, name: &str) -> Result<Vec<NameRecord>, StoreError> {
        // LIMIT 2 is enough to detect a broken uniqueness invariant
        let rows: Vec<NameRow> = sqlx::query_as(
            r#"
            SELECT owner_hi, owner_lo, name, modified_at, enabled
            FROM cjk_names
            WHERE name = $1
            LIMIT 2
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("query name by name", e))?;

        Ok(rows.into_iter().map(NameRecord::from).collect())
    }

    async fn query_by_owner(&self, owner: OwnerId) -> Result<Vec<NameRecord>, StoreError> {
        let (hi, lo) = owner.halves();
        let rows: Vec<NameRow> = sqlx::query_as(
            r#"
            SELECT owner_hi, owner_lo, name, modified_at, enabled
            FROM cjk_names
            WHERE owner_hi = $1 AND owner_lo = $2
            LIMIT 2
            "#,
        )
        .bind(hi)
        .bind(lo)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("query name by owner", e))?;

        Ok(rows.into_iter().map(NameRecord::from).collect())
    }

    async fn insert(&self, record: &NameRecord) -> Result<u64, StoreError> {
        let (hi, lo) = record.owner.halves();
        let result = sqlx::query(
            r#"
            INSERT INTO cjk_names (owner_hi, owner_lo, name, modified_at, enabled)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(hi)
        .bind(lo)
        .bind(&record.name)
        .bind(record.last_modified.as_millis())
        .bind(record.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("insert name", e))?;

        Ok(result.rows_affected())
    }

    async fn update_by_owner(&self, record: &NameRecord) -> Result<u64, StoreError> {
        let (hi, lo) = record.owner.halves();
        let result = sqlx::query(
            r#"
            UPDATE cjk_names SET
                name = $3,
                modified_at = $4,
                enabled = $5
            WHERE owner_hi = $1 AND owner_lo = $2
            "#,
        )
        .bind(hi)
        .bind(lo)
        .bind(&record.name)
        .bind(record.last_modified.as_millis())
        .bind(record.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("update name", e))?;

        Ok(result.rows_affected())
    }

    async fn set_enabled(
        &self,
        owner: OwnerId,
        enabled: bool,
        modified_at: Timestamp,
    ) -> Result<u64, StoreError> {
        let (hi, lo) = owner.halves();
        let result = sqlx::query(
            r#"
            UPDATE cjk_names SET enabled = $3, modified_at = $4
            WHERE owner_hi = $1 AND owner_lo = $2
            "#,
        )
        .bind(hi)
        .bind(lo)
        .bind(enabled)
        .bind(modified_at.as_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("toggle name", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_by_owner(&self, owner: OwnerId) -> Result<u64, StoreError> {
        let (hi, lo) = owner.halves();
        let result = sqlx::query("DELETE FROM cjk_names WHERE owner_hi = $1 AND owner_lo = $2")
            .bind(hi)
            .bind(lo)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete name", e))?;

        Ok(result.rows_affected())
    }

    /// No-op: the accessor holds no prepared statements of its own, and the
    /// pool belongs to the connection source.
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
