//! Export service domain logic for the expense tracker.
//!
//! Queries persisted expenses with their lookup names and renders them in
//! the same CSV layout the importer accepts, so an exported file can be
//! imported again unchanged.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::expense::{ExpenseExportRow, ExpenseFilter};
use crate::domain::row_parser::{columns, format_display_date};
use crate::error::ExportError;
use crate::storage::{Connection, ExpenseStorage};

/// A rendered export
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub content: String,
    pub filename: String,
    pub row_count: usize,
}

/// Export service that handles all export-related business logic
pub struct ExportService<C: Connection> {
    expense_repository: Arc<C::ExpenseRepository>,
}

impl<C: Connection> Clone for ExportService<C> {
    fn clone(&self) -> Self {
        Self {
            expense_repository: Arc::clone(&self.expense_repository),
        }
    }
}

impl<C: Connection> ExportService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            expense_repository: Arc::new(connection.create_expense_repository()),
        }
    }

    /// Render the expenses matching `filter` as CSV text, newest first.
    ///
    /// The header row is always present, even when nothing matches.
    pub async fn export_csv(&self, filter: ExpenseFilter) -> Result<CsvExport, ExportError> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(ExportError::InvalidRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        info!(?filter, "Exporting expenses as CSV");
        let rows = self.expense_repository.list_expenses(&filter).await?;
        let content = render_csv(&rows)?;
        let filename = export_filename(Utc::now().date_naive());

        info!(row_count = rows.len(), bytes = content.len(), %filename, "Export rendered");
        Ok(CsvExport {
            content,
            filename,
            row_count: rows.len(),
        })
    }
}

/// Suggested download name, e.g. `expenses_20240131.csv`
pub fn export_filename(today: NaiveDate) -> String {
    format!("expenses_{}.csv", today.format("%Y%m%d"))
}

fn render_csv(rows: &[ExpenseExportRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let encode_error = |e: csv::Error| ExportError::Encode(e.to_string());

    writer.write_record(columns::EXPORT_ORDER).map_err(encode_error)?;
    for row in rows {
        writer
            .write_record([
                format_display_date(row.date),
                row.amount.to_string(),
                row.category.clone(),
                row.description.clone(),
                row.group.clone(),
                row.payer.clone(),
                row.payment_mode.clone(),
            ])
            .map_err(encode_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
}
