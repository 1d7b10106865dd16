//! CSV import orchestration.
//!
//! Decodes the whole file up front, then fans rows out with a bounded
//! `buffer_unordered` so lookups and inserts of independent rows overlap.
//! Every row ends in exactly one bucket of the returned [`ImportSummary`];
//! only a file that cannot be tokenized at all short-circuits the job.

use futures::stream::{self, StreamExt};
use shared::{ImportErrorKind, ImportRowError, ImportSummary, RawRecord};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::entity_resolver::EntityResolver;
use crate::domain::models::expense::{NewExpense, ValidatedRow};
use crate::domain::models::lookup::LookupTable;
use crate::domain::row_parser::parse_row;
use crate::error::{ImportError, ResolutionError};
use crate::storage::{Connection, ExpenseStorage, LookupStorage};

/// Default number of rows in flight per import job
pub const DEFAULT_IMPORT_CONCURRENCY: usize = 16;

enum RowOutcome {
    Inserted(i64),
    Failed(ImportRowError),
}

impl RowOutcome {
    fn failed(row: usize, kind: ImportErrorKind, message: String, record: RawRecord) -> Self {
        RowOutcome::Failed(ImportRowError {
            row: Some(row),
            kind,
            message,
            record: Some(record),
        })
    }
}

pub struct ImportService<C: Connection> {
    lookup_repository: Arc<C::LookupRepository>,
    expense_repository: Arc<C::ExpenseRepository>,
    concurrency: usize,
}

impl<C: Connection> Clone for ImportService<C> {
    fn clone(&self) -> Self {
        Self {
            lookup_repository: Arc::clone(&self.lookup_repository),
            expense_repository: Arc::clone(&self.expense_repository),
            concurrency: self.concurrency,
        }
    }
}

impl<C: Connection> ImportService<C> {
    pub fn new(connection: Arc<C>, concurrency: usize) -> Self {
        Self {
            lookup_repository: Arc::new(connection.create_lookup_repository()),
            expense_repository: Arc::new(connection.create_expense_repository()),
            concurrency: concurrency.max(1),
        }
    }

    /// Import every record of `text`, returning per-row outcomes as counts
    pub async fn import_csv(&self, text: &str) -> ImportSummary {
        let records = match decode_records(text) {
            Ok(records) => records,
            Err(err) => return structural_failure(text, err),
        };

        let total_rows = records.len();
        info!(total_rows, concurrency = self.concurrency, "Starting CSV import");

        // One cache per job, dropped with it
        let resolver = EntityResolver::new(Arc::clone(&self.lookup_repository));

        let outcomes: Vec<RowOutcome> = stream::iter(records)
            .map(|decoded| self.process_row(&resolver, decoded.row, decoded.fields))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = ImportSummary {
            total_rows,
            ..ImportSummary::default()
        };
        for outcome in outcomes {
            match outcome {
                RowOutcome::Inserted(id) => {
                    summary.successful_inserts += 1;
                    summary.inserted_ids.push(id);
                }
                RowOutcome::Failed(err) => {
                    summary.failed_inserts += 1;
                    summary.errors.push(err);
                }
            }
        }
        summary.errors.sort_by_key(|e| e.row);

        info!(
            total_rows,
            successful = summary.successful_inserts,
            failed = summary.failed_inserts,
            lookups_cached = resolver.cached_keys(),
            "CSV import finished"
        );
        summary
    }

    async fn process_row(
        &self,
        resolver: &EntityResolver<C::LookupRepository>,
        row: usize,
        record: RawRecord,
    ) -> RowOutcome {
        let parsed = match parse_row(&record) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                let kind = if rejection.is_structural() {
                    error!(row, %rejection, ?record, "Malformed CSV record: required column absent");
                    ImportErrorKind::MissingColumn
                } else {
                    warn!(row, %rejection, ?record, "Rejecting invalid row");
                    ImportErrorKind::Validation
                };
                return RowOutcome::failed(row, kind, rejection.to_string(), record);
            }
        };

        let expense = match resolve_ids(resolver, &parsed).await {
            Ok(expense) => expense,
            Err(message) => {
                warn!(row, %message, record = ?parsed.original, "Could not resolve lookup entities");
                return RowOutcome::failed(row, ImportErrorKind::Resolution, message, parsed.original);
            }
        };

        match self.expense_repository.insert_expense(&expense).await {
            Ok(id) => {
                debug!(row, id, "Inserted expense");
                RowOutcome::Inserted(id)
            }
            Err(err) => {
                warn!(row, error = %err, record = ?parsed.original, "Expense insert failed");
                RowOutcome::failed(row, ImportErrorKind::Persistence, err.to_string(), parsed.original)
            }
        }
    }
}

/// Resolve the four lookup ids of a row concurrently
async fn resolve_ids<S: LookupStorage + 'static>(
    resolver: &EntityResolver<S>,
    row: &ValidatedRow,
) -> Result<NewExpense, String> {
    let (group, category, payer, payment_mode) = tokio::join!(
        resolver.resolve_or_create(LookupTable::ExpenseGroup, &row.group),
        resolver.resolve_or_create(LookupTable::ExpenseCategory, &row.category),
        resolver.resolve_or_create(LookupTable::Payer, &row.payer),
        resolver.resolve_or_create(LookupTable::PaymentMode, &row.payment_mode),
    );

    Ok(NewExpense {
        date: row.date,
        amount: row.amount,
        description: row.description.clone(),
        group_id: require_id(LookupTable::ExpenseGroup, group)?,
        category_id: require_id(LookupTable::ExpenseCategory, category)?,
        payer_id: require_id(LookupTable::Payer, payer)?,
        payment_mode_id: require_id(LookupTable::PaymentMode, payment_mode)?,
    })
}

fn require_id(
    table: LookupTable,
    resolved: Result<Option<i64>, ResolutionError>,
) -> Result<i64, String> {
    match resolved {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(format!("{} name is blank", table)),
        Err(err) => Err(err.to_string()),
    }
}

/// A decoded record and its data row number in the upload
struct DecodedRecord {
    row: usize,
    fields: RawRecord,
}

/// Decode CSV text into header-keyed records, skipping blank lines
///
/// Row numbers follow the source lines, counting the line after the header
/// as row 1, so skipped blank lines still advance them.
fn decode_records(text: &str) -> Result<Vec<DecodedRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::StructuralDecode(e.to_string()))?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::StructuralDecode("CSV has no header row".to_string()));
    }

    let header_line = headers.position().map_or(1, |pos| pos.line());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ImportError::StructuralDecode(e.to_string()))?;
        // A whitespace-only line decodes as one blank field; `,,,` is a real record
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        let row = record
            .position()
            .map_or(index + 1, |pos| pos.line().saturating_sub(header_line) as usize);
        // Short records simply lack the trailing keys; extra fields are dropped
        let raw: RawRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        records.push(DecodedRecord { row, fields: raw });
    }
    Ok(records)
}

fn structural_failure(text: &str, err: ImportError) -> ImportSummary {
    let total_rows = text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .count();
    error!(error = %err, total_rows, "Aborting import: CSV could not be decoded");

    ImportSummary {
        successful_inserts: 0,
        failed_inserts: total_rows,
        total_rows,
        inserted_ids: Vec::new(),
        errors: vec![ImportRowError {
            row: None,
            kind: ImportErrorKind::Structural,
            message: err.to_string(),
            record: None,
        }],
    }
}
