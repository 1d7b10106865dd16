//! # Error Types
//!
//! Failures that cross layer boundaries. Startup and configuration code uses
//! `anyhow`; everything the import pipeline has to classify lives here so a
//! failing row can be put in the right bucket instead of aborting the batch.

use thiserror::Error;

use crate::domain::models::lookup::LookupTable;

/// Failure reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StorageError::ForeignKeyViolation(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => StorageError::NotFound,
            _ => StorageError::Database(err.to_string()),
        }
    }
}

/// Why a single CSV record was rejected before any storage work
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowRejection {
    #[error("column '{column}' is missing from the record")]
    MissingColumn { column: &'static str },

    #[error("invalid date '{value}', expected D-Mon-YYYY")]
    InvalidDate { value: String },

    #[error("invalid amount '{value}'")]
    InvalidAmount { value: String },

    #[error("column '{column}' is empty")]
    EmptyField { column: &'static str },
}

impl RowRejection {
    /// Missing keys point at a malformed file rather than bad data
    pub fn is_structural(&self) -> bool {
        matches!(self, RowRejection::MissingColumn { .. })
    }
}

/// Failure to find or create a lookup entity.
///
/// Cloneable because one outcome is handed to every caller that joined the
/// same in-flight resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("{table} '{name}' could not be created and was not found after a duplicate-key retry")]
    Conflict { table: LookupTable, name: String },

    #[error("{table} '{name}' could not be resolved: {message}")]
    Storage {
        table: LookupTable,
        name: String,
        message: String,
    },

    #[error("resolution of {table} '{name}' was interrupted")]
    Interrupted { table: LookupTable, name: String },
}

/// Fatal import failure; everything else is handled per row
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV could not be decoded: {0}")]
    StructuralDecode(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("CSV could not be written: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("name must not be empty")]
    InvalidName,

    #[error("{table} {id} not found")]
    NotFound { table: LookupTable, id: i64 },

    #[error("{table} named '{name}' already exists")]
    NameTaken { table: LookupTable, name: String },

    #[error("{table} {id} is referenced by {references} expense(s)")]
    InUse {
        table: LookupTable,
        id: i64,
        references: i64,
    },

    #[error(transparent)]
    Storage(StorageError),
}
