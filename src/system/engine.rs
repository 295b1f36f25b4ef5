use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::bootstrap::bootstrap_all;
use super::context::GenerationContext;
use super::descriptor::SystemTableDescriptor;
use super::generator::GeneratorRegistry;
use super::registry::{SystemTableId, TableRegistry};
use super::row::Row;
use super::stats::{CacheStatus, TableStats};
use crate::catalog::{CatalogSource, TableInfo};
use crate::error::{InfoSchemaError, Result};
use crate::query::{self, QueryResult};
use crate::rights::AccessControl;
use crate::session::{Session, SessionRegistry};

/// Facts about the hosting database that `SYSTEM_PROPERTIES` and
/// `SYSTEM_SESSIONINFO` report
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub database: String,
    pub owner: String,
    pub properties: BTreeMap<String, String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            database: ":memory:".to_string(),
            owner: "SA".to_string(),
            properties: BTreeMap::new(),
        }
    }
}

/// Materialized rows of one system table as seen by one session.
///
/// Rows are shared with the session's store; a cache hit hands out the
/// same allocation again.
#[derive(Debug, Clone)]
pub struct SystemTableInstance {
    descriptor: Arc<SystemTableDescriptor>,
    rows: Arc<Vec<Row>>,
    stamp: Option<u64>,
}

impl SystemTableInstance {
    pub fn descriptor(&self) -> &SystemTableDescriptor {
        &self.descriptor
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.descriptor.column_names()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Counter value the rows were built at
    pub fn stamp(&self) -> Option<u64> {
        self.stamp
    }

    pub fn shares_rows_with(&self, other: &SystemTableInstance) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }
}

/// The information schema of one database
pub struct InformationSchema {
    registry: TableRegistry,
    descriptors: HashMap<SystemTableId, Arc<SystemTableDescriptor>>,
    generators: GeneratorRegistry,
    catalog: Arc<dyn CatalogSource>,
    access: Arc<dyn AccessControl>,
    sessions: Arc<SessionRegistry>,
    stats: HashMap<SystemTableId, TableStats>,
    system_tables: Vec<TableInfo>,
    settings: EngineSettings,
}

impl InformationSchema {
    /// Bootstraps every system table. A malformed declaration is fatal.
    pub fn open(
        catalog: Arc<dyn CatalogSource>,
        access: Arc<dyn AccessControl>,
        settings: EngineSettings,
    ) -> Result<Self> {
        Self::with_generators(catalog, access, settings, GeneratorRegistry::new())
    }

    pub fn with_generators(
        catalog: Arc<dyn CatalogSource>,
        access: Arc<dyn AccessControl>,
        settings: EngineSettings,
        generators: GeneratorRegistry,
    ) -> Result<Self> {
        let registry = TableRegistry::new();
        let descriptors = bootstrap_all(&registry)?;

        let mut ids: Vec<SystemTableId> = descriptors.keys().copied().collect();
        ids.sort();
        let system_tables = ids.iter().map(|id| descriptors[id].table_info()).collect();
        let stats = ids.iter().map(|id| (*id, TableStats::default())).collect();

        info!(
            "Information schema ready for {} ({} system tables)",
            settings.database,
            ids.len()
        );

        Ok(Self {
            registry,
            descriptors,
            generators,
            catalog,
            access,
            sessions: Arc::new(SessionRegistry::new()),
            stats,
            system_tables,
            settings,
        })
    }

    /// Opens a session for an existing authorization
    pub fn new_session(&self, user: &str) -> Result<Session> {
        if !self.access.exists(user) {
            return Err(InfoSchemaError::UnknownAuthorization(user.to_string()));
        }
        let schema = self.catalog.default_schema();
        Ok(Session::new(Arc::clone(&self.sessions), user, &schema))
    }

    /// Makes sure the session's rows of `id` reflect the current schema
    /// change counter, rebuilding them and their sources if not
    pub fn ensure_content(&self, session: &mut Session, id: SystemTableId) -> Result<()> {
        let counter = self.catalog.schema_change_counter()?;
        self.ensure_at(session, id, counter)
    }

    fn ensure_at(&self, session: &mut Session, id: SystemTableId, counter: u64) -> Result<()> {
        let Some(descriptor) = self.descriptors.get(&id) else {
            return Ok(());
        };
        let Some(generator) = self.generators.resolve(id) else {
            trace!("No generator for {}", id);
            return Ok(());
        };
        let Some(stats) = self.stats.get(&id) else {
            return Ok(());
        };

        if descriptor.cacheable && session.stamp(id) == Some(counter) {
            stats.record_hit();
            trace!("Cache hit for {} at {}", id, counter);
            return Ok(());
        }

        for source in &descriptor.sources {
            self.ensure_at(session, *source, counter)?;
        }

        let capability = self.access.capability(&session.user())?;

        let mut store = session.take_store(id);
        store.clear();
        store.set_stamp(Some(counter));
        stats.record_rebuild();

        let result = {
            let mut ctx = GenerationContext::new(self, session, descriptor, &mut store, capability, stats);
            generator(&mut ctx)
        };
        if let Err(e) = &result {
            warn!("Failed to generate {}: {}", id, e);
            store.set_stamp(None);
        } else {
            debug!("Rebuilt {} for session {} ({} rows)", id, session.id(), store.len());
        }
        session.put_store(id, store);
        result
    }

    /// Materializes a system table by name for the session. Names outside
    /// the information schema, and tables without content, yield `None`.
    pub fn fetch(&self, session: &mut Session, name: &str) -> Result<Option<SystemTableInstance>> {
        match self.registry.id_of(name) {
            Some(id) => self.fetch_id(session, id),
            None => Ok(None),
        }
    }

    pub fn fetch_id(&self, session: &mut Session, id: SystemTableId) -> Result<Option<SystemTableInstance>> {
        let Some(descriptor) = self.descriptors.get(&id) else {
            return Ok(None);
        };
        if self.generators.resolve(id).is_none() {
            return Ok(None);
        }
        self.ensure_content(session, id)?;
        let store = session.store(id);
        Ok(Some(SystemTableInstance {
            descriptor: Arc::clone(descriptor),
            rows: store.map(|s| s.snapshot()).unwrap_or_default(),
            stamp: store.and_then(|s| s.stamp()),
        }))
    }

    /// Runs a `SELECT` against a system table; other statements yield
    /// `None`
    pub fn query(&self, session: &mut Session, sql: &str) -> Result<Option<QueryResult>> {
        session.set_current_statement(Some(sql));
        let result = query::execute(self, session, sql);
        session.set_current_statement(None);
        result
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn descriptor(&self, id: SystemTableId) -> Option<&SystemTableDescriptor> {
        self.descriptors.get(&id).map(|d| d.as_ref())
    }

    pub fn catalog(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    pub fn access(&self) -> &dyn AccessControl {
        self.access.as_ref()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Catalog entries of the system tables that have content
    pub fn system_tables(&self) -> &[TableInfo] {
        &self.system_tables
    }

    pub fn schema_change_counter(&self) -> Result<u64> {
        self.catalog.schema_change_counter()
    }

    /// Per-table materialization counters, in table order
    pub fn cache_statuses(&self) -> Vec<CacheStatus> {
        let mut statuses: Vec<CacheStatus> = self
            .stats
            .iter()
            .map(|(id, stats)| stats.status(*id, self.registry.is_cacheable(*id)))
            .collect();
        statuses.sort_by_key(|s| s.table);
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ChangeCounter, ColumnInfo, DataType, MemoryCatalog, QualifiedName, TableInfo, TableKind,
    };
    use crate::rights::GranteeManager;

    fn engine() -> (InformationSchema, Arc<MemoryCatalog>, Arc<GranteeManager>) {
        let counter = ChangeCounter::new();
        let catalog = Arc::new(MemoryCatalog::new("SA", counter.clone()));
        let grants = Arc::new(GranteeManager::new(counter));
        grants.create_admin("SA").unwrap();
        grants.create_user("ALICE", None).unwrap();
        let engine =
            InformationSchema::open(catalog.clone(), grants.clone(), EngineSettings::default()).unwrap();
        (engine, catalog, grants)
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        let (engine, _, _) = engine();
        assert!(matches!(
            engine.new_session("MALLORY"),
            Err(InfoSchemaError::UnknownAuthorization(_))
        ));
    }

    #[test]
    fn test_repeated_fetch_is_a_hit() {
        let (engine, _, _) = engine();
        let mut session = engine.new_session("SA").unwrap();
        let first = engine.fetch(&mut session, "TABLES").unwrap().unwrap();
        let second = engine.fetch(&mut session, "information_schema.tables").unwrap().unwrap();
        assert!(first.shares_rows_with(&second));
        let status = engine
            .cache_statuses()
            .into_iter()
            .find(|s| s.table == SystemTableId::Tables)
            .unwrap();
        assert_eq!(status.rebuilds, 1);
        assert_eq!(status.hits, 1);
    }

    #[test]
    fn test_schema_change_rebuilds() {
        let (engine, catalog, _) = engine();
        let mut session = engine.new_session("SA").unwrap();
        let before = engine.fetch(&mut session, "TABLES").unwrap().unwrap();
        catalog
            .create_table(
                TableInfo::new(QualifiedName::new("PUBLIC", "T1"), "SA", TableKind::BaseTable)
                    .with_column(ColumnInfo::new("ID", DataType::integer())),
            )
            .unwrap();
        let after = engine.fetch(&mut session, "TABLES").unwrap().unwrap();
        assert!(!before.shares_rows_with(&after));
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn test_reserved_and_foreign_names() {
        let (engine, _, _) = engine();
        let mut session = engine.new_session("SA").unwrap();
        assert!(engine.fetch(&mut session, "JARS").unwrap().is_none());
        assert!(engine.fetch(&mut session, "PUBLIC.TABLES").unwrap().is_none());
        assert!(engine.fetch(&mut session, "NO_SUCH_TABLE").unwrap().is_none());
    }

    #[test]
    fn test_composed_table_builds_its_sources() {
        let (engine, _, _) = engine();
        let mut session = engine.new_session("ALICE").unwrap();
        engine.fetch(&mut session, "ROLE_TABLE_GRANTS").unwrap().unwrap();
        let counter = engine.schema_change_counter().unwrap();
        assert_eq!(session.stamp(SystemTableId::TablePrivileges), Some(counter));
        assert_eq!(session.stamp(SystemTableId::ApplicableRoles), Some(counter));
    }

    #[test]
    fn test_non_cacheable_table_always_rebuilds() {
        let (engine, _, _) = engine();
        let mut session = engine.new_session("SA").unwrap();
        let first = engine.fetch(&mut session, "SYSTEM_SESSIONS").unwrap().unwrap();
        let second = engine.fetch(&mut session, "SYSTEM_SESSIONS").unwrap().unwrap();
        assert!(!first.shares_rows_with(&second));
    }
}
