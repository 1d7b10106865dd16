//! # Storage Module
//!
//! Handles all data persistence for the expense tracker.
//!
//! The domain layer only sees the traits in [`traits`]; the SQLite
//! implementation lives in [`sqlite`]. Every query or command is treated as
//! atomic and independent, and partial success of an import is an intended
//! outcome, so no multi-statement transactions are used.

pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use sqlite::DbConnection;
pub use traits::{Connection, ExpenseStorage, LookupStorage, StorageResult};
