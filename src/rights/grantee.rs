use std::collections::HashSet;

use super::{ColumnAccess, GrantCapability, GrantRecord};
use crate::catalog::{ObjectKind, SYSTEM_AUTHORIZATION, SchemaObject};

/// Point-in-time rights of one authorization.
///
/// Built by [`super::GranteeManager::capability`]; later grants do not
/// affect an existing snapshot.
#[derive(Debug, Clone)]
pub struct Grantee {
    name: String,
    admin: bool,
    roles: Vec<String>,
    held: HashSet<String>,
    grants: Vec<GrantRecord>,
}

impl Grantee {
    pub fn new(name: String, admin: bool, roles: Vec<String>, grants: Vec<GrantRecord>) -> Self {
        let mut held: HashSet<String> = roles.iter().cloned().collect();
        held.insert(name.clone());
        Self {
            name,
            admin,
            roles,
            held,
            grants,
        }
    }

    pub fn grants(&self) -> &[GrantRecord] {
        &self.grants
    }

    fn owns(&self, object: &dyn SchemaObject) -> bool {
        self.held.contains(object.owner())
    }

    fn has_grant_on(&self, object: &dyn SchemaObject) -> bool {
        let kind = object.kind();
        let name = object.qualified_name();
        if kind == ObjectKind::Schema {
            return self.grants.iter().any(|g| g.object.schema == name.name);
        }
        self.grants
            .iter()
            .any(|g| g.object_kind == kind && g.object == name && !g.privileges.is_empty())
    }
}

impl GrantCapability for Grantee {
    fn authorization(&self) -> &str {
        &self.name
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn is_accessible(&self, object: &dyn SchemaObject) -> bool {
        self.admin
            || object.owner() == SYSTEM_AUTHORIZATION
            || self.owns(object)
            || self.has_grant_on(object)
    }

    fn is_fully_accessible(&self, object: &dyn SchemaObject) -> bool {
        self.admin || self.owns(object)
    }

    fn column_access(&self, table: &dyn SchemaObject) -> ColumnAccess {
        if self.admin || self.owns(table) || table.owner() == SYSTEM_AUTHORIZATION {
            return ColumnAccess::All;
        }
        let name = table.qualified_name();
        let mut columns = HashSet::new();
        for grant in self
            .grants
            .iter()
            .filter(|g| g.object_kind == ObjectKind::Table && g.object == name)
        {
            match &grant.columns {
                None if !grant.privileges.is_empty() => return ColumnAccess::All,
                None => {}
                Some(granted) => columns.extend(granted.iter().cloned()),
            }
        }
        if columns.is_empty() {
            ColumnAccess::Nothing
        } else {
            ColumnAccess::Only(columns)
        }
    }

    fn enabled_roles(&self) -> &[String] {
        &self.roles
    }

    fn holds(&self, authorization: &str) -> bool {
        self.held.contains(authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnInfo, DataType, QualifiedName, TableInfo, TableKind};
    use crate::rights::{PUBLIC_ROLE, Privileges};

    fn table(name: &str, owner: &str) -> TableInfo {
        TableInfo::new(QualifiedName::new("PUBLIC", name), owner, TableKind::BaseTable)
            .with_column(ColumnInfo::new("A", DataType::integer()))
            .with_column(ColumnInfo::new("B", DataType::integer()))
    }

    fn grant(table: &str, columns: Option<Vec<&str>>) -> GrantRecord {
        GrantRecord {
            grantor: "DBA".into(),
            grantee: "ALICE".into(),
            object_kind: ObjectKind::Table,
            object: QualifiedName::new("PUBLIC", table),
            columns: columns.map(|c| c.into_iter().map(String::from).collect()),
            privileges: Privileges::SELECT,
            grantable: false,
        }
    }

    #[test]
    fn test_grant_gives_visibility_not_definition() {
        let alice = Grantee::new("ALICE".into(), false, vec![PUBLIC_ROLE.into()], vec![grant("T1", None)]);
        let t1 = table("T1", "DBA");
        let t2 = table("T2", "DBA");
        assert!(alice.is_accessible(&t1));
        assert!(!alice.is_fully_accessible(&t1));
        assert!(!alice.is_accessible(&t2));
        assert_eq!(alice.column_access(&t1), ColumnAccess::All);
    }

    #[test]
    fn test_column_grant_restricts_columns() {
        let alice = Grantee::new("ALICE".into(), false, vec![], vec![grant("T1", Some(vec!["B"]))]);
        let access = alice.column_access(&table("T1", "DBA"));
        assert!(access.allows("B"));
        assert!(!access.allows("A"));
    }

    #[test]
    fn test_ownership_through_role() {
        let alice = Grantee::new("ALICE".into(), false, vec!["OWNERS".into()], vec![]);
        let t1 = table("T1", "OWNERS");
        assert!(alice.is_fully_accessible(&t1));
        assert!(alice.holds("OWNERS"));
        assert!(alice.holds("ALICE"));
    }

    #[test]
    fn test_system_objects_visible_to_everyone() {
        let nobody = Grantee::new("BOB".into(), false, vec![], vec![]);
        let sys = table("SYSTEM_TABLES", SYSTEM_AUTHORIZATION);
        assert!(nobody.is_accessible(&sys));
        assert!(!nobody.is_fully_accessible(&sys));
    }
}
