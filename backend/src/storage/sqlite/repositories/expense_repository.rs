use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use crate::domain::models::expense::{ExpenseExportRow, ExpenseFilter, NewExpense};
use crate::error::StorageError;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{ExpenseStorage, StorageResult};

/// Dates are stored as ISO text so range filters can compare lexically
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for expense operations
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DbConnection,
}

impl ExpenseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_export(row: &SqliteRow) -> StorageResult<ExpenseExportRow> {
        let raw_date: String = row.try_get("date")?;
        let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|e| {
            StorageError::Database(format!("stored date '{}' is not YYYY-MM-DD: {}", raw_date, e))
        })?;

        Ok(ExpenseExportRow {
            id: row.try_get("id")?,
            date,
            amount: row.try_get("amount")?,
            description: row.try_get("description")?,
            group: row.try_get("group_name")?,
            category: row.try_get("category_name")?,
            payer: row.try_get("payer_name")?,
            payment_mode: row.try_get("payment_mode_name")?,
        })
    }
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    async fn insert_expense(&self, expense: &NewExpense) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (date, amount, description, group_id, category_id, payer_id, payment_mode_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.date.format(DATE_FORMAT).to_string())
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(expense.group_id)
        .bind(expense.category_id)
        .bind(expense.payer_id)
        .bind(expense.payment_mode_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_expenses(&self, filter: &ExpenseFilter) -> StorageResult<Vec<ExpenseExportRow>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT e.id, e.date, e.amount, e.description,
                   g.name AS group_name,
                   c.name AS category_name,
                   p.name AS payer_name,
                   m.name AS payment_mode_name
            FROM expenses e
            JOIN expense_groups g ON g.id = e.group_id
            JOIN expense_categories c ON c.id = e.category_id
            JOIN payers p ON p.id = e.payer_id
            JOIN payment_modes m ON m.id = e.payment_mode_id
            WHERE 1 = 1
            "#,
        );

        if let Some(start) = filter.start_date {
            builder
                .push(" AND e.date >= ")
                .push_bind(start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = filter.end_date {
            builder
                .push(" AND e.date <= ")
                .push_bind(end.format(DATE_FORMAT).to_string());
        }
        if let Some(group_ids) = &filter.group_ids {
            if group_ids.is_empty() {
                builder.push(" AND 1 = 0");
            } else {
                builder.push(" AND e.group_id IN (");
                let mut separated = builder.separated(", ");
                for id in group_ids {
                    separated.push_bind(*id);
                }
                separated.push_unseparated(")");
            }
        }
        builder.push(" ORDER BY e.date DESC, e.id DESC");

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::row_to_export).collect()
    }
}
