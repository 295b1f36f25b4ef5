use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::RwLock;

use super::registry::SessionRegistry;
use crate::system::{SessionStore, SystemTableId};

/// Publicly visible facts about a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub uuid: uuid::Uuid,
    pub user: String,
    pub connected: NaiveDateTime,
    pub autocommit: bool,
    pub read_only: bool,
    pub max_rows: u64,
    pub current_schema: String,
    pub current_statement: Option<String>,
}

/// A connection's view of the information schema.
///
/// Owns one store per materialized system table; the stores go away with
/// the session.
pub struct Session {
    info: Arc<RwLock<SessionInfo>>,
    registry: Arc<SessionRegistry>,
    stores: HashMap<SystemTableId, SessionStore>,
}

impl Session {
    pub(crate) fn new(registry: Arc<SessionRegistry>, user: &str, schema: &str) -> Self {
        let info = registry.register(user, schema);
        Self {
            info,
            registry,
            stores: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.info.read().id
    }

    pub fn user(&self) -> String {
        self.info.read().user.clone()
    }

    pub fn info(&self) -> SessionInfo {
        self.info.read().clone()
    }

    pub fn set_autocommit(&mut self, autocommit: bool) {
        self.info.write().autocommit = autocommit;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.info.write().read_only = read_only;
    }

    pub fn set_max_rows(&mut self, max_rows: u64) {
        self.info.write().max_rows = max_rows;
    }

    pub fn set_current_schema(&mut self, schema: &str) {
        self.info.write().current_schema = schema.to_string();
    }

    pub fn set_current_statement(&mut self, statement: Option<&str>) {
        self.info.write().current_statement = statement.map(String::from);
    }

    pub fn store(&self, id: SystemTableId) -> Option<&SessionStore> {
        self.stores.get(&id)
    }

    /// Detaches a table's store so it can be rebuilt while the rest of the
    /// session stays readable
    pub(crate) fn take_store(&mut self, id: SystemTableId) -> SessionStore {
        self.stores.remove(&id).unwrap_or_default()
    }

    pub(crate) fn put_store(&mut self, id: SystemTableId, store: SessionStore) {
        self.stores.insert(id, store);
    }

    /// Stamp of a table's store, `None` if never built
    pub fn stamp(&self, id: SystemTableId) -> Option<u64> {
        self.stores.get(&id).and_then(SessionStore::stamp)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let id = self.info.read().id;
        self.registry.remove(id);
    }
}
