//! Request-coalescing lookup cache for the four lookup tables.
//!
//! Rows are processed concurrently, so dozens of rows naming the same
//! category can ask for its id before any of them has found or created it.
//! The resolver guarantees one storage round-trip sequence per
//! `(table, name)` key per import job:
//!
//! 1. The first caller registers a pending resolution in the cache *before*
//!    any I/O happens. Later callers for the same key join that resolution.
//! 2. The resolution selects the id, inserts the name if it is missing, and
//!    on a duplicate-key error (a writer outside this job won the race)
//!    selects once more.
//! 3. A successful resolution stays cached for the rest of the job. A failed
//!    one is evicted, but only if the cache entry still belongs to it, so a
//!    newer attempt for the same key is never thrown away by a stale failure.
//!
//! Resolutions run as spawned tasks, so a registered entry always settles
//! even if every caller waiting on it is dropped.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::models::lookup::LookupTable;
use crate::error::{ResolutionError, StorageError};
use crate::storage::LookupStorage;

type SharedResolution = Shared<BoxFuture<'static, Result<i64, ResolutionError>>>;

/// Cache key. Every lookup table keys on its `name` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    table: LookupTable,
    name: String,
}

struct PendingResolution {
    generation: u64,
    outcome: SharedResolution,
}

/// Lazily-creating, request-coalescing resolver of lookup names to ids.
///
/// Create one per import job; the cache is never shared between jobs.
pub struct EntityResolver<S: LookupStorage + 'static> {
    storage: Arc<S>,
    entries: Arc<DashMap<ResolutionKey, PendingResolution>>,
    next_generation: AtomicU64,
}

impl<S: LookupStorage + 'static> EntityResolver<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            entries: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Return the id for `name` in `table`, creating the entity on first use.
    ///
    /// Blank names never reach storage and resolve to `Ok(None)`.
    pub async fn resolve_or_create(
        &self,
        table: LookupTable,
        name: &str,
    ) -> Result<Option<i64>, ResolutionError> {
        let name = name.trim();
        if name.is_empty() {
            warn!(table = table.table_name(), "Refusing to resolve a blank name");
            return Ok(None);
        }

        let key = ResolutionKey {
            table,
            name: name.to_string(),
        };

        // The shard lock is held only while the entry is inspected or
        // registered, never across an await.
        let outcome = match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(table = table.table_name(), name, "Joining pending resolution");
                entry.get().outcome.clone()
            }
            Entry::Vacant(entry) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let outcome = self.spawn_resolution(key, generation);
                entry.insert(PendingResolution {
                    generation,
                    outcome: outcome.clone(),
                });
                outcome
            }
        };

        outcome.await.map(Some)
    }

    /// Number of keys currently cached, pending or resolved
    pub fn cached_keys(&self) -> usize {
        self.entries.len()
    }

    fn spawn_resolution(&self, key: ResolutionKey, generation: u64) -> SharedResolution {
        let storage = Arc::clone(&self.storage);
        let entries = Arc::clone(&self.entries);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let result = find_or_insert(storage.as_ref(), &task_key).await;
            if let Err(err) = &result {
                warn!(
                    table = task_key.table.table_name(),
                    name = %task_key.name,
                    error = %err,
                    "Resolution failed, evicting cache entry"
                );
                entries.remove_if(&task_key, |_, pending| pending.generation == generation);
            }
            result
        });

        let entries = Arc::clone(&self.entries);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    warn!(table = key.table.table_name(), name = %key.name, error = %join_err, "Resolution task aborted");
                    // The task never reached its own eviction
                    entries.remove_if(&key, |_, pending| pending.generation == generation);
                    Err(ResolutionError::Interrupted {
                        table: key.table,
                        name: key.name,
                    })
                }
            }
        }
        .boxed()
        .shared()
    }
}

async fn find_or_insert<S: LookupStorage + ?Sized>(
    storage: &S,
    key: &ResolutionKey,
) -> Result<i64, ResolutionError> {
    let table = key.table;
    let name = key.name.as_str();
    let storage_failure = |err: StorageError| ResolutionError::Storage {
        table,
        name: name.to_string(),
        message: err.to_string(),
    };

    if let Some(id) = storage
        .find_lookup_id(table, name)
        .await
        .map_err(storage_failure)?
    {
        debug!(table = table.table_name(), name, id, "Found existing entity");
        return Ok(id);
    }

    match storage.insert_lookup(table, name).await {
        Ok(id) => {
            info!(table = table.table_name(), name, id, "Created entity");
            Ok(id)
        }
        Err(StorageError::UniqueViolation(detail)) => {
            debug!(table = table.table_name(), name, %detail, "Lost insert race, selecting again");
            match storage
                .find_lookup_id(table, name)
                .await
                .map_err(storage_failure)?
            {
                Some(id) => Ok(id),
                None => Err(ResolutionError::Conflict {
                    table,
                    name: name.to_string(),
                }),
            }
        }
        Err(err) => Err(storage_failure(err)),
    }
}
