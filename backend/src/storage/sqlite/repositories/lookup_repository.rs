use async_trait::async_trait;
use shared::LookupEntity;
use sqlx::Row;
use tracing::debug;

use crate::domain::models::lookup::LookupTable;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{LookupStorage, StorageResult};

/// Repository for the four lookup tables
#[derive(Clone)]
pub struct LookupRepository {
    db: DbConnection,
}

impl LookupRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LookupStorage for LookupRepository {
    async fn find_lookup_id(&self, table: LookupTable, name: &str) -> StorageResult<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = ?",
            table.table_name(),
            table.name_column()
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("id")?)),
            None => Ok(None),
        }
    }

    async fn insert_lookup(&self, table: LookupTable, name: &str) -> StorageResult<i64> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?)",
            table.table_name(),
            table.name_column()
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .execute(self.db.pool())
            .await?;

        let id = result.last_insert_rowid();
        debug!(table = table.table_name(), name, id, "Inserted lookup entity");
        Ok(id)
    }

    async fn list_lookups(&self, table: LookupTable) -> StorageResult<Vec<LookupEntity>> {
        let sql = format!(
            "SELECT id, {col} AS name FROM {} ORDER BY {col} ASC",
            table.table_name(),
            col = table.name_column()
        );
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;

        rows.iter()
            .map(|row| -> StorageResult<LookupEntity> {
                Ok(LookupEntity {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn rename_lookup(&self, table: LookupTable, id: i64, name: &str) -> StorageResult<bool> {
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE id = ?",
            table.table_name(),
            table.name_column()
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_lookup(&self, table: LookupTable, id: i64) -> StorageResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.table_name());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_references(&self, table: LookupTable, id: i64) -> StorageResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS refs FROM expenses WHERE {} = ?",
            table.reference_column()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get("refs")?)
    }
}
