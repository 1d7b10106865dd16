//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use async_trait::async_trait;
use shared::LookupEntity;

use crate::domain::models::expense::{ExpenseExportRow, ExpenseFilter, NewExpense};
use crate::domain::models::lookup::LookupTable;
use crate::error::StorageError;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Trait defining the interface for lookup table storage operations
///
/// Each call is treated as one atomic, independent command; callers never
/// wrap several of them in a transaction.
#[async_trait]
pub trait LookupStorage: Send + Sync {
    /// Find the id of the entity with exactly this name
    async fn find_lookup_id(&self, table: LookupTable, name: &str) -> StorageResult<Option<i64>>;

    /// Insert a new entity and return its generated id
    ///
    /// Fails with `StorageError::UniqueViolation` if the name already exists.
    async fn insert_lookup(&self, table: LookupTable, name: &str) -> StorageResult<i64>;

    /// List all entities of a table ordered by name
    async fn list_lookups(&self, table: LookupTable) -> StorageResult<Vec<LookupEntity>>;

    /// Rename an entity. Returns false if no entity has this id.
    async fn rename_lookup(&self, table: LookupTable, id: i64, name: &str) -> StorageResult<bool>;

    /// Delete an entity. Returns false if no entity has this id.
    async fn delete_lookup(&self, table: LookupTable, id: i64) -> StorageResult<bool>;

    /// Count the expenses pointing at an entity
    async fn count_references(&self, table: LookupTable, id: i64) -> StorageResult<i64>;
}

/// Trait defining the interface for expense storage operations
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Insert a single expense and return its generated id
    ///
    /// Fails with `StorageError::ForeignKeyViolation` if a lookup id is stale.
    async fn insert_expense(&self, expense: &NewExpense) -> StorageResult<i64>;

    /// List expenses joined with their lookup names, most recent date first
    async fn list_expenses(&self, filter: &ExpenseFilter) -> StorageResult<Vec<ExpenseExportRow>>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories. Repositories are `'static`
/// so resolution work can be handed to spawned tasks.
pub trait Connection: Send + Sync + Clone + 'static {
    /// The type of LookupStorage this connection creates
    type LookupRepository: LookupStorage + 'static;

    /// The type of ExpenseStorage this connection creates
    type ExpenseRepository: ExpenseStorage + 'static;

    /// Create a new lookup repository for this connection
    fn create_lookup_repository(&self) -> Self::LookupRepository;

    /// Create a new expense repository for this connection
    fn create_expense_repository(&self) -> Self::ExpenseRepository;
}
