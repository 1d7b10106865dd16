//! Listing, renaming and deleting lookup entities.
//!
//! Imports only ever create lookup rows; renames and deletes happen here,
//! and a delete is refused while any expense still points at the entity.

use shared::LookupEntity;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::lookup::LookupTable;
use crate::error::{LookupError, StorageError};
use crate::storage::{Connection, LookupStorage};

pub struct LookupService<C: Connection> {
    lookup_repository: Arc<C::LookupRepository>,
}

impl<C: Connection> Clone for LookupService<C> {
    fn clone(&self) -> Self {
        Self {
            lookup_repository: Arc::clone(&self.lookup_repository),
        }
    }
}

impl<C: Connection> LookupService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            lookup_repository: Arc::new(connection.create_lookup_repository()),
        }
    }

    pub async fn list(&self, table: LookupTable) -> Result<Vec<LookupEntity>, LookupError> {
        self.lookup_repository
            .list_lookups(table)
            .await
            .map_err(LookupError::Storage)
    }

    pub async fn rename(
        &self,
        table: LookupTable,
        id: i64,
        new_name: &str,
    ) -> Result<LookupEntity, LookupError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(LookupError::InvalidName);
        }

        match self.lookup_repository.rename_lookup(table, id, name).await {
            Ok(true) => {
                info!(table = table.table_name(), id, name, "Renamed lookup entity");
                Ok(LookupEntity {
                    id,
                    name: name.to_string(),
                })
            }
            Ok(false) => Err(LookupError::NotFound { table, id }),
            Err(StorageError::UniqueViolation(_)) => Err(LookupError::NameTaken {
                table,
                name: name.to_string(),
            }),
            Err(err) => Err(LookupError::Storage(err)),
        }
    }

    pub async fn delete(&self, table: LookupTable, id: i64) -> Result<(), LookupError> {
        let references = self
            .lookup_repository
            .count_references(table, id)
            .await
            .map_err(LookupError::Storage)?;
        if references > 0 {
            warn!(table = table.table_name(), id, references, "Refusing to delete referenced entity");
            return Err(LookupError::InUse {
                table,
                id,
                references,
            });
        }

        match self.lookup_repository.delete_lookup(table, id).await {
            Ok(true) => {
                info!(table = table.table_name(), id, "Deleted lookup entity");
                Ok(())
            }
            Ok(false) => Err(LookupError::NotFound { table, id }),
            // A reference added after the count still trips the foreign key
            Err(StorageError::ForeignKeyViolation(_)) => Err(LookupError::InUse {
                table,
                id,
                references: 1,
            }),
            Err(err) => Err(LookupError::Storage(err)),
        }
    }
}
