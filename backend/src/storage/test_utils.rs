/// Test utilities for exercising the import pipeline without SQLite
///
/// `MockStorage` keeps everything in memory, counts inserts, and can
/// inject the failures the resolver has to survive: a rival writer winning
/// the insert race, a duplicate-key error with no row behind it, and plain
/// storage outages.
use async_trait::async_trait;
use shared::LookupEntity;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::models::expense::{ExpenseExportRow, ExpenseFilter, NewExpense};
use crate::domain::models::lookup::LookupTable;
use crate::error::StorageError;
use crate::storage::traits::{Connection, ExpenseStorage, LookupStorage, StorageResult};

type LookupKey = (LookupTable, String);

#[derive(Default)]
struct MockState {
    next_id: i64,
    lookups: HashMap<LookupKey, i64>,
    expenses: Vec<(i64, NewExpense)>,
    insert_calls: HashMap<LookupKey, usize>,
    select_calls: HashMap<LookupKey, usize>,
    rival_inserts: HashSet<LookupKey>,
    phantom_conflicts: HashMap<LookupKey, usize>,
    broken_names: HashSet<String>,
    rejected_descriptions: HashSet<String>,
}

impl MockState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory storage with failure injection and call counters
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Arc<Mutex<MockState>>,
    latency: Duration,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every storage call sleeps this long, widening race windows
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock storage mutex poisoned")
    }

    async fn suspend(&self) {
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Pre-populate an entity as if it had been created earlier
    pub fn seed_lookup(&self, table: LookupTable, name: &str) -> i64 {
        let mut state = self.state();
        let id = state.allocate_id();
        state.lookups.insert((table, name.to_string()), id);
        id
    }

    /// The next insert of this name loses to a writer outside the job: the
    /// row appears and the insert reports a duplicate key.
    pub fn simulate_rival_insert(&self, table: LookupTable, name: &str) {
        self.state().rival_inserts.insert((table, name.to_string()));
    }

    /// The next `times` inserts of this name report a duplicate key but no
    /// row ever becomes visible.
    pub fn simulate_phantom_conflict(&self, table: LookupTable, name: &str, times: usize) {
        self.state()
            .phantom_conflicts
            .insert((table, name.to_string()), times);
    }

    /// Any lookup of this name fails with a database error
    pub fn break_lookups_named(&self, name: &str) {
        self.state().broken_names.insert(name.to_string());
    }

    /// Expense inserts with this description fail with a foreign key error
    pub fn reject_expenses_described(&self, description: &str) {
        self.state()
            .rejected_descriptions
            .insert(description.to_string());
    }

    pub fn insert_calls(&self, table: LookupTable, name: &str) -> usize {
        self.state()
            .insert_calls
            .get(&(table, name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn select_calls(&self, table: LookupTable, name: &str) -> usize {
        self.state()
            .select_calls
            .get(&(table, name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn lookup_count(&self, table: LookupTable) -> usize {
        self.state()
            .lookups
            .keys()
            .filter(|(t, _)| *t == table)
            .count()
    }

    pub fn lookup_id(&self, table: LookupTable, name: &str) -> Option<i64> {
        self.state().lookups.get(&(table, name.to_string())).copied()
    }

    pub fn expenses(&self) -> Vec<(i64, NewExpense)> {
        self.state().expenses.clone()
    }

    fn name_of(state: &MockState, table: LookupTable, id: i64) -> Option<String> {
        state
            .lookups
            .iter()
            .find(|((t, _), v)| *t == table && **v == id)
            .map(|((_, name), _)| name.clone())
    }
}

#[async_trait]
impl LookupStorage for MockStorage {
    async fn find_lookup_id(&self, table: LookupTable, name: &str) -> StorageResult<Option<i64>> {
        self.suspend().await;
        let mut state = self.state();
        if state.broken_names.contains(name) {
            return Err(StorageError::Database(format!("lookup of '{}' failed", name)));
        }
        let key = (table, name.to_string());
        *state.select_calls.entry(key.clone()).or_default() += 1;
        Ok(state.lookups.get(&key).copied())
    }

    async fn insert_lookup(&self, table: LookupTable, name: &str) -> StorageResult<i64> {
        self.suspend().await;
        let mut state = self.state();
        let key = (table, name.to_string());
        *state.insert_calls.entry(key.clone()).or_default() += 1;

        if state.rival_inserts.remove(&key) {
            let id = state.allocate_id();
            state.lookups.insert(key, id);
            return Err(StorageError::UniqueViolation(format!("{}.name", table.table_name())));
        }
        if let Some(remaining) = state.phantom_conflicts.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StorageError::UniqueViolation(format!("{}.name", table.table_name())));
            }
        }
        if state.lookups.contains_key(&key) {
            return Err(StorageError::UniqueViolation(format!("{}.name", table.table_name())));
        }

        let id = state.allocate_id();
        state.lookups.insert(key, id);
        Ok(id)
    }

    async fn list_lookups(&self, table: LookupTable) -> StorageResult<Vec<LookupEntity>> {
        let state = self.state();
        let mut entities: Vec<LookupEntity> = state
            .lookups
            .iter()
            .filter(|((t, _), _)| *t == table)
            .map(|((_, name), id)| LookupEntity {
                id: *id,
                name: name.clone(),
            })
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entities)
    }

    async fn rename_lookup(&self, table: LookupTable, id: i64, name: &str) -> StorageResult<bool> {
        let mut state = self.state();
        let Some(old_name) = Self::name_of(&state, table, id) else {
            return Ok(false);
        };
        if state.lookups.contains_key(&(table, name.to_string())) {
            return Err(StorageError::UniqueViolation(format!("{}.name", table.table_name())));
        }
        state.lookups.remove(&(table, old_name));
        state.lookups.insert((table, name.to_string()), id);
        Ok(true)
    }

    async fn delete_lookup(&self, table: LookupTable, id: i64) -> StorageResult<bool> {
        let mut state = self.state();
        match Self::name_of(&state, table, id) {
            Some(name) => {
                state.lookups.remove(&(table, name));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_references(&self, table: LookupTable, id: i64) -> StorageResult<i64> {
        let state = self.state();
        let count = state
            .expenses
            .iter()
            .filter(|(_, e)| match table {
                LookupTable::ExpenseGroup => e.group_id == id,
                LookupTable::ExpenseCategory => e.category_id == id,
                LookupTable::Payer => e.payer_id == id,
                LookupTable::PaymentMode => e.payment_mode_id == id,
            })
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl ExpenseStorage for MockStorage {
    async fn insert_expense(&self, expense: &NewExpense) -> StorageResult<i64> {
        self.suspend().await;
        let mut state = self.state();
        if state.rejected_descriptions.contains(&expense.description) {
            return Err(StorageError::ForeignKeyViolation("expenses".to_string()));
        }
        let id = state.allocate_id();
        state.expenses.push((id, expense.clone()));
        Ok(id)
    }

    async fn list_expenses(&self, filter: &ExpenseFilter) -> StorageResult<Vec<ExpenseExportRow>> {
        let state = self.state();
        let mut rows: Vec<ExpenseExportRow> = state
            .expenses
            .iter()
            .filter(|(_, e)| filter.start_date.map_or(true, |start| e.date >= start))
            .filter(|(_, e)| filter.end_date.map_or(true, |end| e.date <= end))
            .filter(|(_, e)| {
                filter
                    .group_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&e.group_id))
            })
            .map(|(id, e)| ExpenseExportRow {
                id: *id,
                date: e.date,
                amount: e.amount,
                description: e.description.clone(),
                group: Self::name_of(&state, LookupTable::ExpenseGroup, e.group_id).unwrap_or_default(),
                category: Self::name_of(&state, LookupTable::ExpenseCategory, e.category_id)
                    .unwrap_or_default(),
                payer: Self::name_of(&state, LookupTable::Payer, e.payer_id).unwrap_or_default(),
                payment_mode: Self::name_of(&state, LookupTable::PaymentMode, e.payment_mode_id)
                    .unwrap_or_default(),
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

impl Connection for MockStorage {
    type LookupRepository = MockStorage;
    type ExpenseRepository = MockStorage;

    fn create_lookup_repository(&self) -> Self::LookupRepository {
        self.clone()
    }

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        self.clone()
    }
}
