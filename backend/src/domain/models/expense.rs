use chrono::NaiveDate;
use shared::RawRecord;

/// A CSV record that passed validation but has no lookup ids yet
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub group: String,
    pub payer: String,
    pub payment_mode: String,
    /// Empty when the column is absent or blank
    pub description: String,
    /// Kept only for diagnostics
    pub original: RawRecord,
}

/// A fully keyed expense ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub group_id: i64,
    pub category_id: i64,
    pub payer_id: i64,
    pub payment_mode_id: i64,
}

/// A persisted expense joined with the names of its lookup entities
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseExportRow {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub group: String,
    pub category: String,
    pub payer: String,
    pub payment_mode: String,
}

/// Restrictions applied to an export query. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub group_ids: Option<Vec<i64>>,
}
