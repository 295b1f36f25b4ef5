// Catalog collaborators: the object model and the sources that expose it
pub mod memory;
pub mod objects;
pub mod sqlite;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

pub use memory::MemoryCatalog;
pub use objects::*;
pub use sqlite::SqliteCatalog;

/// Schema-change counter shared between a catalog and the grant manager.
///
/// Every structural mutation (DDL, grant, revoke) bumps it; readers only
/// compare snapshots.
#[derive(Debug, Clone, Default)]
pub struct ChangeCounter {
    value: Arc<AtomicU64>,
}

impl ChangeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advance the counter, returning the new value
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Read-only view of the database catalog.
///
/// Iteration order of every collection is the order rows are emitted in.
pub trait CatalogSource: Send + Sync {
    fn schema_change_counter(&self) -> Result<u64>;

    fn catalog_name(&self) -> String;

    fn default_schema(&self) -> String;

    fn schemas(&self) -> Result<Vec<SchemaInfo>>;

    fn tables(&self) -> Result<Vec<TableInfo>>;

    fn routines(&self) -> Result<Vec<RoutineInfo>> {
        Ok(Vec::new())
    }

    fn sequences(&self) -> Result<Vec<SequenceInfo>> {
        Ok(Vec::new())
    }

    fn triggers(&self) -> Result<Vec<TriggerInfo>> {
        Ok(Vec::new())
    }

    fn domains(&self) -> Result<Vec<DomainInfo>> {
        Ok(Vec::new())
    }

    fn character_sets(&self) -> Result<Vec<CharacterSetInfo>> {
        Ok(Vec::new())
    }

    fn collations(&self) -> Result<Vec<CollationInfo>> {
        Ok(Vec::new())
    }
}
