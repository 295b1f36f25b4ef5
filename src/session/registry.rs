use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use parking_lot::RwLock;
use tracing::debug;

use super::state::SessionInfo;

/// Live sessions of one engine, listed by `SYSTEM_SESSIONS`
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    sessions: RwLock<BTreeMap<u64, Arc<RwLock<SessionInfo>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, user: &str, schema: &str) -> Arc<RwLock<SessionInfo>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let info = Arc::new(RwLock::new(SessionInfo {
            id,
            uuid: uuid::Uuid::new_v4(),
            user: user.to_string(),
            connected: Local::now().naive_local(),
            autocommit: true,
            read_only: false,
            max_rows: 0,
            current_schema: schema.to_string(),
            current_statement: None,
        }));
        self.sessions.write().insert(id, Arc::clone(&info));
        debug!("Registered session {} for {}", id, user);
        info
    }

    pub(crate) fn remove(&self, id: u64) {
        if self.sessions.write().remove(&id).is_some() {
            debug!("Session {} closed", id);
        }
    }

    /// Copies of every live session, in creation order
    pub fn snapshot(&self) -> Vec<SessionInfo> {
        self.sessions.read().values().map(|s| s.read().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }
}
