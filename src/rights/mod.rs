// Grant and role model consulted while building system table rows
pub mod grantee;
pub mod manager;

use std::collections::HashSet;
use std::sync::Arc;

use bitflags::bitflags;

use crate::catalog::{ObjectKind, QualifiedName, SchemaObject};
use crate::error::Result;

pub use grantee::Grantee;
pub use manager::{GrantFile, GranteeManager};

/// Role every authorization holds implicitly
pub const PUBLIC_ROLE: &str = "PUBLIC";

/// Role that confers administrative rights
pub const DBA_ROLE: &str = "DBA";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Privileges: u16 {
        const SELECT = 1;
        const INSERT = 1 << 1;
        const UPDATE = 1 << 2;
        const DELETE = 1 << 3;
        const REFERENCES = 1 << 4;
        const TRIGGER = 1 << 5;
        const USAGE = 1 << 6;
        const EXECUTE = 1 << 7;
    }
}

const PRIVILEGE_NAMES: [(Privileges, &str); 8] = [
    (Privileges::SELECT, "SELECT"),
    (Privileges::INSERT, "INSERT"),
    (Privileges::UPDATE, "UPDATE"),
    (Privileges::DELETE, "DELETE"),
    (Privileges::REFERENCES, "REFERENCES"),
    (Privileges::TRIGGER, "TRIGGER"),
    (Privileges::USAGE, "USAGE"),
    (Privileges::EXECUTE, "EXECUTE"),
];

impl Privileges {
    /// Individual privilege names in the order the views emit them
    pub fn names(&self) -> Vec<&'static str> {
        PRIVILEGE_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("ALL") {
            return Some(Privileges::all());
        }
        PRIVILEGE_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(flag, _)| *flag)
    }

    /// Everything that can be granted on an object of `kind`
    pub fn applicable_to(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Table => {
                Privileges::SELECT
                    | Privileges::INSERT
                    | Privileges::UPDATE
                    | Privileges::DELETE
                    | Privileges::REFERENCES
                    | Privileges::TRIGGER
            }
            ObjectKind::Routine => Privileges::EXECUTE,
            ObjectKind::Sequence
            | ObjectKind::Domain
            | ObjectKind::CharacterSet
            | ObjectKind::Collation => Privileges::USAGE,
            ObjectKind::Schema | ObjectKind::Trigger => Privileges::empty(),
        }
    }

    /// Privileges that may be granted per column
    pub fn column_level() -> Self {
        Privileges::SELECT | Privileges::INSERT | Privileges::UPDATE | Privileges::REFERENCES
    }
}

/// A privilege grant on one object, optionally narrowed to columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRecord {
    pub grantor: String,
    pub grantee: String,
    pub object_kind: ObjectKind,
    pub object: QualifiedName,
    /// `None` grants on the whole object
    pub columns: Option<Vec<String>>,
    pub privileges: Privileges,
    pub grantable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub grantee: String,
    pub role: String,
    pub grantor: String,
    pub admin_option: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationKind {
    User,
    Role,
}

impl AuthorizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationKind::User => "USER",
            AuthorizationKind::Role => "ROLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub name: String,
    pub kind: AuthorizationKind,
    pub admin: bool,
    pub initial_schema: Option<String>,
}

/// Which columns of a table a capability may see. Column names match
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnAccess {
    All,
    Only(HashSet<String>),
    Nothing,
}

impl ColumnAccess {
    pub fn allows(&self, column: &str) -> bool {
        match self {
            ColumnAccess::All => true,
            ColumnAccess::Only(columns) => columns.iter().any(|c| c.eq_ignore_ascii_case(column)),
            ColumnAccess::Nothing => false,
        }
    }
}

/// Evaluated rights of one authorization, roles expanded
pub trait GrantCapability: Send + Sync {
    fn authorization(&self) -> &str;

    fn is_admin(&self) -> bool;

    /// Whether the object may be listed at all
    fn is_accessible(&self, object: &dyn SchemaObject) -> bool;

    /// Whether definition text (bodies, clauses) of the object may be shown
    fn is_fully_accessible(&self, object: &dyn SchemaObject) -> bool;

    fn column_access(&self, table: &dyn SchemaObject) -> ColumnAccess;

    /// Roles in effect, transitively expanded, `PUBLIC` included
    fn enabled_roles(&self) -> &[String];

    /// Whether `authorization` is this grantee itself or one of its roles
    fn holds(&self, authorization: &str) -> bool;
}

/// Source of capabilities and of the grant records the privilege views list
pub trait AccessControl: Send + Sync {
    fn capability(&self, authorization: &str) -> Result<Arc<dyn GrantCapability>>;

    fn exists(&self, authorization: &str) -> bool;

    fn authorizations(&self) -> Vec<Authorization>;

    fn role_grants(&self) -> Vec<RoleGrant>;

    fn grants(&self) -> Vec<GrantRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_names_in_order() {
        let p = Privileges::UPDATE | Privileges::SELECT;
        assert_eq!(p.names(), vec!["SELECT", "UPDATE"]);
    }

    #[test]
    fn test_parse_privileges() {
        assert_eq!(Privileges::parse("select"), Some(Privileges::SELECT));
        assert_eq!(Privileges::parse("ALL"), Some(Privileges::all()));
        assert_eq!(Privileges::parse("FLY"), None);
    }

    #[test]
    fn test_applicable_privileges() {
        assert!(Privileges::applicable_to(ObjectKind::Table).contains(Privileges::TRIGGER));
        assert_eq!(Privileges::applicable_to(ObjectKind::Routine), Privileges::EXECUTE);
        assert_eq!(Privileges::applicable_to(ObjectKind::Sequence), Privileges::USAGE);
    }

    #[test]
    fn test_column_access() {
        let only = ColumnAccess::Only(["A".to_string()].into_iter().collect());
        assert!(only.allows("A"));
        assert!(!only.allows("B"));
        assert!(only.allows("a"));
        assert!(ColumnAccess::All.allows("B"));
        assert!(!ColumnAccess::Nothing.allows("A"));
    }
}
