use serde::{Deserialize, Serialize};
use shared::LookupKind;
use std::fmt;

/// One of the four lookup tables an expense references.
///
/// Every table has the same shape: an integer id and a unique, case-sensitive
/// `name` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupTable {
    ExpenseGroup,
    ExpenseCategory,
    Payer,
    PaymentMode,
}

impl LookupTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            LookupTable::ExpenseGroup => "expense_groups",
            LookupTable::ExpenseCategory => "expense_categories",
            LookupTable::Payer => "payers",
            LookupTable::PaymentMode => "payment_modes",
        }
    }

    pub fn name_column(&self) -> &'static str {
        "name"
    }

    /// Column on `expenses` holding the foreign key into this table
    pub fn reference_column(&self) -> &'static str {
        match self {
            LookupTable::ExpenseGroup => "group_id",
            LookupTable::ExpenseCategory => "category_id",
            LookupTable::Payer => "payer_id",
            LookupTable::PaymentMode => "payment_mode_id",
        }
    }
}

impl fmt::Display for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupTable::ExpenseGroup => "expense group",
            LookupTable::ExpenseCategory => "expense category",
            LookupTable::Payer => "payer",
            LookupTable::PaymentMode => "payment mode",
        };
        f.write_str(label)
    }
}

impl From<LookupKind> for LookupTable {
    fn from(kind: LookupKind) -> Self {
        match kind {
            LookupKind::Groups => LookupTable::ExpenseGroup,
            LookupKind::Categories => LookupTable::ExpenseCategory,
            LookupKind::Payers => LookupTable::Payer,
            LookupKind::PaymentModes => LookupTable::PaymentMode,
        }
    }
}
