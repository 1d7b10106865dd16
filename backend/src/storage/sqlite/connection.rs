use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

use super::repositories::{ExpenseRepository, LookupRepository};
use crate::storage::Connection;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str, max_connections: u32) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!(url, "Creating database");
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    ///
    /// A single pooled connection keeps the in-memory database alive and
    /// serializes writes, while callers can still interleave freely.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url, 1).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for table in ["expense_groups", "expense_categories", "payers", "payment_modes"] {
            let ddl = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE
                );
                "#
            );
            sqlx::query(&ddl).execute(pool).await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                group_id INTEGER NOT NULL REFERENCES expense_groups (id),
                category_id INTEGER NOT NULL REFERENCES expense_categories (id),
                payer_id INTEGER NOT NULL REFERENCES payers (id),
                payment_mode_id INTEGER NOT NULL REFERENCES payment_modes (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Exports filter and order by date
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_date
            ON expenses(date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_group_id
            ON expenses(group_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type LookupRepository = LookupRepository;
    type ExpenseRepository = ExpenseRepository;

    fn create_lookup_repository(&self) -> Self::LookupRepository {
        LookupRepository::new(self.clone())
    }

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }
}
