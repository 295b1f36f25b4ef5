use std::sync::Arc;

use tracing::trace;

use super::descriptor::SystemTableDescriptor;
use super::engine::InformationSchema;
use super::registry::SystemTableId;
use super::row::{InsertOutcome, Row};
use super::stats::TableStats;
use super::store::SessionStore;
use crate::catalog::{CatalogSource, SchemaObject, TableInfo, TableKind};
use crate::error::{InfoSchemaError, Result};
use crate::rights::{AccessControl, GrantCapability};
use crate::session::Session;

/// Everything a generator may read while filling one table for one session
pub struct GenerationContext<'a> {
    engine: &'a InformationSchema,
    session: &'a Session,
    descriptor: &'a SystemTableDescriptor,
    store: &'a mut SessionStore,
    capability: Arc<dyn GrantCapability>,
    stats: &'a TableStats,
}

impl<'a> GenerationContext<'a> {
    pub(crate) fn new(
        engine: &'a InformationSchema,
        session: &'a Session,
        descriptor: &'a SystemTableDescriptor,
        store: &'a mut SessionStore,
        capability: Arc<dyn GrantCapability>,
        stats: &'a TableStats,
    ) -> Self {
        Self {
            engine,
            session,
            descriptor,
            store,
            capability,
            stats,
        }
    }

    /// All-null row of the table's width
    pub fn new_row(&self) -> Row {
        Row::new(self.descriptor.column_count())
    }

    /// Submits a row. Key collisions are discarded silently; shape or type
    /// violations abort generation.
    pub fn commit(&mut self, row: Row) -> Result<InsertOutcome> {
        let outcome = self.store.insert(self.descriptor, row)?;
        match outcome {
            InsertOutcome::Committed => self.stats.record_committed(),
            InsertOutcome::DuplicateDiscarded => {
                self.stats.record_discarded();
                trace!("Discarded duplicate row in {}", self.descriptor.id);
            }
        }
        Ok(outcome)
    }

    pub fn descriptor(&self) -> &SystemTableDescriptor {
        self.descriptor
    }

    pub fn engine(&self) -> &'a InformationSchema {
        self.engine
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    pub fn catalog(&self) -> &'a dyn CatalogSource {
        self.engine.catalog()
    }

    pub fn access(&self) -> &'a dyn AccessControl {
        self.engine.access()
    }

    pub fn capability(&self) -> &dyn GrantCapability {
        self.capability.as_ref()
    }

    pub fn catalog_name(&self) -> String {
        self.engine.catalog().catalog_name()
    }

    /// Rows of a declared source table, already materialized at the same
    /// counter value as this table
    pub fn source(&self, id: SystemTableId) -> Result<&'a [Row]> {
        if !self.descriptor.sources.contains(&id) {
            return Err(InfoSchemaError::NotSupported(format!(
                "{} is not a declared source of {}",
                id, self.descriptor.id
            )));
        }
        Ok(self.session.store(id).map(SessionStore::rows).unwrap_or(&[]))
    }

    /// Catalog tables followed by the system tables themselves
    pub fn all_tables(&self) -> Result<Vec<TableInfo>> {
        let mut tables = self.catalog().tables()?;
        tables.extend(self.engine.system_tables().iter().cloned());
        Ok(tables)
    }

    pub fn is_accessible_table(&self, table: &TableInfo) -> bool {
        table.kind == TableKind::System || self.capability.is_accessible(table)
    }

    pub fn is_accessible(&self, object: &dyn SchemaObject) -> bool {
        self.capability.is_accessible(object)
    }

    /// Whether definition text of the object may be revealed
    pub fn is_fully_accessible(&self, object: &dyn SchemaObject) -> bool {
        self.capability.is_fully_accessible(object)
    }
}
