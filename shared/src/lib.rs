use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A raw CSV record keyed by header name, as it appeared in the uploaded file
pub type RawRecord = BTreeMap<String, String>;

/// Result of a CSV import job
///
/// Every decoded record ends up in exactly one bucket, so
/// `successful_inserts + failed_inserts == total_rows` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Number of expenses persisted
    pub successful_inserts: usize,
    /// Number of records that were rejected or could not be persisted
    pub failed_inserts: usize,
    /// Number of decoded records (header excluded)
    pub total_rows: usize,
    /// Ids of the persisted expenses, in completion order
    pub inserted_ids: Vec<i64>,
    /// One entry per failed record (a single entry for a structural failure)
    pub errors: Vec<ImportRowError>,
}

/// Why a record did not make it into the expense table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportErrorKind {
    /// The CSV text could not be tokenized at all
    Structural,
    /// A required column key was absent from the record
    MissingColumn,
    /// Bad date, bad amount or an empty required field
    Validation,
    /// A lookup entity could not be found or created
    Resolution,
    /// The expense insert itself was refused
    Persistence,
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImportErrorKind::Structural => "structural",
            ImportErrorKind::MissingColumn => "missing column",
            ImportErrorKind::Validation => "validation",
            ImportErrorKind::Resolution => "resolution",
            ImportErrorKind::Persistence => "persistence",
        };
        f.write_str(label)
    }
}

/// Diagnostic entry for a failed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    /// Source line of the record counted from the line after the header (which is 1);
    /// `None` for structural failures
    pub row: Option<usize>,
    pub kind: ImportErrorKind,
    pub message: String,
    /// The raw record, when one could be decoded
    pub record: Option<RawRecord>,
}

/// The four kinds of lookup entity an expense points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKind {
    Groups,
    Categories,
    Payers,
    PaymentModes,
}

impl LookupKind {
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Groups,
        LookupKind::Categories,
        LookupKind::Payers,
        LookupKind::PaymentModes,
    ];

    /// Path segment used by the REST API
    pub fn slug(&self) -> &'static str {
        match self {
            LookupKind::Groups => "groups",
            LookupKind::Categories => "categories",
            LookupKind::Payers => "payers",
            LookupKind::PaymentModes => "payment-modes",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

/// A named reference row (group, category, payer or payment mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupListResponse {
    pub kind: LookupKind,
    pub entities: Vec<LookupEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameLookupRequest {
    pub name: String,
}
