use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    AccessControl, Authorization, AuthorizationKind, DBA_ROLE, GrantCapability, GrantRecord,
    Grantee, PUBLIC_ROLE, Privileges, RoleGrant,
};
use crate::catalog::{ChangeCounter, ObjectKind, QualifiedName, SYSTEM_AUTHORIZATION};
use crate::error::{InfoSchemaError, Result};

#[derive(Debug, Default)]
struct GrantState {
    authorizations: Vec<Authorization>,
    role_grants: Vec<RoleGrant>,
    grants: Vec<GrantRecord>,
}

impl GrantState {
    fn find(&self, name: &str) -> Option<&Authorization> {
        self.authorizations.iter().find(|a| a.name == name)
    }

    fn require(&self, name: &str) -> Result<&Authorization> {
        self.find(name)
            .ok_or_else(|| InfoSchemaError::UnknownAuthorization(name.to_string()))
    }

    fn require_role(&self, name: &str) -> Result<()> {
        match self.require(name)?.kind {
            AuthorizationKind::Role => Ok(()),
            AuthorizationKind::User => Err(InfoSchemaError::InvalidGrant(format!("{name} is not a role"))),
        }
    }
}

/// In-memory users, roles and grants.
///
/// Every mutation advances the shared change counter, so cached privilege
/// views are rebuilt exactly as after DDL.
pub struct GranteeManager {
    counter: ChangeCounter,
    state: RwLock<GrantState>,
}

impl GranteeManager {
    /// Creates a manager holding the predefined `PUBLIC` and `DBA` roles
    pub fn new(counter: ChangeCounter) -> Self {
        let state = GrantState {
            authorizations: vec![
                Authorization {
                    name: PUBLIC_ROLE.to_string(),
                    kind: AuthorizationKind::Role,
                    admin: false,
                    initial_schema: None,
                },
                Authorization {
                    name: DBA_ROLE.to_string(),
                    kind: AuthorizationKind::Role,
                    admin: true,
                    initial_schema: None,
                },
            ],
            ..Default::default()
        };
        Self {
            counter,
            state: RwLock::new(state),
        }
    }

    pub fn create_user(&self, name: &str, initial_schema: Option<&str>) -> Result<()> {
        self.create(name, AuthorizationKind::User, initial_schema)
    }

    /// Creates a user holding the `DBA` role
    pub fn create_admin(&self, name: &str) -> Result<()> {
        self.create_user(name, None)?;
        self.grant_role(name, DBA_ROLE, true)
    }

    pub fn create_role(&self, name: &str) -> Result<()> {
        self.create(name, AuthorizationKind::Role, None)
    }

    fn create(&self, name: &str, kind: AuthorizationKind, initial_schema: Option<&str>) -> Result<()> {
        let mut state = self.state.write();
        if name == SYSTEM_AUTHORIZATION || state.find(name).is_some() {
            return Err(InfoSchemaError::DuplicateAuthorization(name.to_string()));
        }
        state.authorizations.push(Authorization {
            name: name.to_string(),
            kind,
            admin: false,
            initial_schema: initial_schema.map(String::from),
        });
        self.changed(&format!("CREATE {} {}", kind.as_str(), name));
        Ok(())
    }

    pub fn grant_role(&self, grantee: &str, role: &str, admin_option: bool) -> Result<()> {
        let mut state = self.state.write();
        state.require(grantee)?;
        state.require_role(role)?;
        if role == PUBLIC_ROLE {
            return Err(InfoSchemaError::InvalidGrant("PUBLIC is granted implicitly".into()));
        }
        if let Some(existing) = state
            .role_grants
            .iter_mut()
            .find(|g| g.grantee == grantee && g.role == role)
        {
            existing.admin_option |= admin_option;
        } else {
            state.role_grants.push(RoleGrant {
                grantee: grantee.to_string(),
                role: role.to_string(),
                grantor: SYSTEM_AUTHORIZATION.to_string(),
                admin_option,
            });
        }
        self.changed(&format!("GRANT {role} TO {grantee}"));
        Ok(())
    }

    pub fn revoke_role(&self, grantee: &str, role: &str) -> Result<()> {
        let mut state = self.state.write();
        state.role_grants.retain(|g| !(g.grantee == grantee && g.role == role));
        self.changed(&format!("REVOKE {role} FROM {grantee}"));
        Ok(())
    }

    /// Grants privileges on a whole object
    pub fn grant(
        &self,
        grantor: &str,
        grantee: &str,
        kind: ObjectKind,
        object: QualifiedName,
        privileges: Privileges,
        grantable: bool,
    ) -> Result<()> {
        self.add_grant(GrantRecord {
            grantor: grantor.to_string(),
            grantee: grantee.to_string(),
            object_kind: kind,
            object,
            columns: None,
            privileges,
            grantable,
        })
    }

    /// Grants privileges on selected columns of a table
    pub fn grant_columns(
        &self,
        grantor: &str,
        grantee: &str,
        table: QualifiedName,
        columns: &[&str],
        privileges: Privileges,
        grantable: bool,
    ) -> Result<()> {
        if !Privileges::column_level().contains(privileges) {
            return Err(InfoSchemaError::InvalidGrant(format!(
                "{} cannot be granted on columns",
                privileges.names().join(", ")
            )));
        }
        self.add_grant(GrantRecord {
            grantor: grantor.to_string(),
            grantee: grantee.to_string(),
            object_kind: ObjectKind::Table,
            object: table,
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            privileges,
            grantable,
        })
    }

    fn add_grant(&self, record: GrantRecord) -> Result<()> {
        let mut state = self.state.write();
        state.require(&record.grantee)?;
        let applicable = Privileges::applicable_to(record.object_kind);
        if record.privileges.is_empty() || !applicable.contains(record.privileges) {
            return Err(InfoSchemaError::InvalidGrant(format!(
                "{} on {}",
                record.privileges.names().join(", "),
                record.object
            )));
        }
        let statement = format!(
            "GRANT {} ON {} TO {}",
            record.privileges.names().join(", "),
            record.object,
            record.grantee
        );
        state.grants.push(record);
        self.changed(&statement);
        Ok(())
    }

    /// Removes `privileges` from every grant the grantee holds on `object`,
    /// column grants included
    pub fn revoke(&self, grantee: &str, kind: ObjectKind, object: &QualifiedName, privileges: Privileges) -> Result<()> {
        let mut state = self.state.write();
        for grant in state
            .grants
            .iter_mut()
            .filter(|g| g.grantee == grantee && g.object_kind == kind && &g.object == object)
        {
            grant.privileges.remove(privileges);
        }
        state.grants.retain(|g| !g.privileges.is_empty());
        self.changed(&format!("REVOKE {} ON {} FROM {}", privileges.names().join(", "), object, grantee));
        Ok(())
    }

    /// Seeds users, roles and grants from a JSON grant file
    pub fn load_file(&self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let file: GrantFile = serde_json::from_str(&text)?;
        info!("Loading grants from {}", path.display());
        self.apply(file)
    }

    pub fn apply(&self, file: GrantFile) -> Result<()> {
        for role in &file.roles {
            self.create_role(role)?;
        }
        for user in &file.users {
            if user.admin {
                self.create_admin(&user.name)?;
            } else {
                self.create_user(&user.name, user.initial_schema.as_deref())?;
            }
        }
        for role_grant in &file.role_grants {
            self.grant_role(&role_grant.grantee, &role_grant.role, role_grant.admin_option)?;
        }
        for entry in file.grants {
            let mut privileges = Privileges::empty();
            for name in &entry.privileges {
                privileges |= Privileges::parse(name)
                    .ok_or_else(|| InfoSchemaError::InvalidGrant(format!("unknown privilege {name}")))?;
            }
            let kind = entry.object_kind()?;
            let object = QualifiedName::new(entry.schema, entry.name);
            if privileges == Privileges::all() {
                privileges = Privileges::applicable_to(kind);
            }
            match entry.columns {
                Some(columns) => {
                    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                    self.grant_columns(&entry.grantor, &entry.grantee, object, &columns, privileges, entry.grantable)?
                }
                None => self.grant(&entry.grantor, &entry.grantee, kind, object, privileges, entry.grantable)?,
            }
        }
        Ok(())
    }

    fn changed(&self, statement: &str) {
        let value = self.counter.bump();
        debug!("{}: schema change counter now {}", statement, value);
    }

    /// Roles reachable from `name`, breadth first, `PUBLIC` last
    fn expand_roles(state: &GrantState, name: &str) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();
        let mut queue = VecDeque::from([name.to_string()]);
        while let Some(current) = queue.pop_front() {
            for grant in state.role_grants.iter().filter(|g| g.grantee == current) {
                if grant.role != name && !roles.contains(&grant.role) {
                    roles.push(grant.role.clone());
                    queue.push_back(grant.role.clone());
                }
            }
        }
        if name != PUBLIC_ROLE && !roles.iter().any(|r| r == PUBLIC_ROLE) {
            roles.push(PUBLIC_ROLE.to_string());
        }
        roles
    }
}

impl AccessControl for GranteeManager {
    fn capability(&self, authorization: &str) -> Result<Arc<dyn GrantCapability>> {
        let state = self.state.read();
        let user = state.require(authorization)?;
        let roles = Self::expand_roles(&state, authorization);
        let admin = user.admin
            || roles
                .iter()
                .any(|r| state.find(r).map(|a| a.admin).unwrap_or(false));
        let grants = state
            .grants
            .iter()
            .filter(|g| g.grantee == authorization || roles.contains(&g.grantee))
            .cloned()
            .collect();
        Ok(Arc::new(Grantee::new(authorization.to_string(), admin, roles, grants)))
    }

    fn exists(&self, authorization: &str) -> bool {
        self.state.read().find(authorization).is_some()
    }

    fn authorizations(&self) -> Vec<Authorization> {
        let state = self.state.read();
        state
            .authorizations
            .iter()
            .map(|a| {
                let mut a = a.clone();
                if a.kind == AuthorizationKind::User {
                    a.admin = Self::expand_roles(&state, &a.name)
                        .iter()
                        .any(|r| state.find(r).map(|role| role.admin).unwrap_or(false));
                }
                a
            })
            .collect()
    }

    fn role_grants(&self) -> Vec<RoleGrant> {
        self.state.read().role_grants.clone()
    }

    fn grants(&self) -> Vec<GrantRecord> {
        self.state.read().grants.clone()
    }
}

/// JSON layout accepted by [`GranteeManager::load_file`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GrantFile {
    pub roles: Vec<String>,
    pub users: Vec<UserEntry>,
    pub role_grants: Vec<RoleGrantEntry>,
    pub grants: Vec<GrantEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub initial_schema: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleGrantEntry {
    pub grantee: String,
    pub role: String,
    #[serde(default)]
    pub admin_option: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantEntry {
    pub grantee: String,
    #[serde(default = "system_grantor")]
    pub grantor: String,
    #[serde(default = "table_kind")]
    pub kind: String,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    pub privileges: Vec<String>,
    #[serde(default)]
    pub grantable: bool,
}

fn system_grantor() -> String {
    SYSTEM_AUTHORIZATION.to_string()
}

fn table_kind() -> String {
    "TABLE".to_string()
}

impl GrantEntry {
    fn object_kind(&self) -> Result<ObjectKind> {
        match self.kind.to_ascii_uppercase().as_str() {
            "TABLE" | "VIEW" => Ok(ObjectKind::Table),
            "ROUTINE" | "FUNCTION" | "PROCEDURE" => Ok(ObjectKind::Routine),
            "SEQUENCE" => Ok(ObjectKind::Sequence),
            "DOMAIN" => Ok(ObjectKind::Domain),
            "CHARACTER SET" => Ok(ObjectKind::CharacterSet),
            "COLLATION" => Ok(ObjectKind::Collation),
            other => Err(InfoSchemaError::InvalidGrant(format!("cannot grant on {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> GranteeManager {
        GranteeManager::new(ChangeCounter::new())
    }

    #[test]
    fn test_roles_expand_transitively() {
        let m = manager();
        m.create_role("READERS").unwrap();
        m.create_role("AUDITORS").unwrap();
        m.create_user("ALICE", None).unwrap();
        m.grant_role("READERS", "AUDITORS", false).unwrap();
        m.grant_role("ALICE", "READERS", false).unwrap();

        let alice = m.capability("ALICE").unwrap();
        assert_eq!(alice.enabled_roles(), ["READERS", "AUDITORS", "PUBLIC"]);
        assert!(!alice.is_admin());
    }

    #[test]
    fn test_dba_role_confers_admin() {
        let m = manager();
        m.create_admin("ROOT").unwrap();
        assert!(m.capability("ROOT").unwrap().is_admin());
        let root = m.authorizations().into_iter().find(|a| a.name == "ROOT").unwrap();
        assert!(root.admin);
    }

    #[test]
    fn test_mutations_bump_counter() {
        let counter = ChangeCounter::new();
        let m = GranteeManager::new(counter.clone());
        m.create_user("ALICE", None).unwrap();
        let before = counter.current();
        m.grant(
            "DBA",
            "ALICE",
            ObjectKind::Table,
            QualifiedName::new("PUBLIC", "T1"),
            Privileges::SELECT,
            false,
        )
        .unwrap();
        assert_eq!(counter.current(), before + 1);
    }

    #[test]
    fn test_unknown_and_duplicate_authorizations() {
        let m = manager();
        assert!(matches!(
            m.capability("NOBODY"),
            Err(InfoSchemaError::UnknownAuthorization(_))
        ));
        m.create_user("ALICE", None).unwrap();
        assert!(matches!(
            m.create_role("ALICE"),
            Err(InfoSchemaError::DuplicateAuthorization(_))
        ));
    }

    #[test]
    fn test_revoke_drops_empty_grants() {
        let m = manager();
        m.create_user("ALICE", None).unwrap();
        let t1 = QualifiedName::new("PUBLIC", "T1");
        m.grant("DBA", "ALICE", ObjectKind::Table, t1.clone(), Privileges::SELECT | Privileges::INSERT, false)
            .unwrap();
        m.revoke("ALICE", ObjectKind::Table, &t1, Privileges::SELECT).unwrap();
        assert_eq!(m.grants()[0].privileges, Privileges::INSERT);
        m.revoke("ALICE", ObjectKind::Table, &t1, Privileges::INSERT).unwrap();
        assert!(m.grants().is_empty());
    }

    #[test]
    fn test_column_grants_reject_table_only_privileges() {
        let m = manager();
        m.create_user("ALICE", None).unwrap();
        let result = m.grant_columns(
            "DBA",
            "ALICE",
            QualifiedName::new("PUBLIC", "T1"),
            &["A"],
            Privileges::DELETE,
            false,
        );
        assert!(matches!(result, Err(InfoSchemaError::InvalidGrant(_))));
    }

    #[test]
    fn test_apply_grant_file() {
        let json = r#"{
            "roles": ["READERS"],
            "users": [{"name": "ALICE"}, {"name": "ROOT", "admin": true}],
            "role_grants": [{"grantee": "ALICE", "role": "READERS"}],
            "grants": [
                {"grantee": "READERS", "schema": "main", "name": "orders", "privileges": ["SELECT"]},
                {"grantee": "ALICE", "schema": "main", "name": "items", "columns": ["sku"], "privileges": ["select"]}
            ]
        }"#;
        let m = manager();
        m.apply(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(m.grants().len(), 2);
        let alice = m.capability("ALICE").unwrap();
        assert!(alice.holds("READERS"));
        assert!(m.capability("ROOT").unwrap().is_admin());
    }
}
